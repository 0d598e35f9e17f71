use clap::Clap;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use memmap::MmapOptions;

use keyhole_core::query::KernelQuery;
use keyhole_core::tables::click_to_kb;
use keyhole_image::StateImage;

use crate::helpers;

/// Show what a state image contains.
#[derive(Clap, Debug)]
pub(crate) struct Info {
    /// State image path
    #[clap(parse(from_os_str))]
    pub image: std::path::PathBuf,
}

impl Info {

    pub(crate) fn run(&self) -> Result<(), Report> {
        let progress = helpers::start();
        let progress = progress.enter("Reading state image");

        progress.single(format!("Mapping {}", self.image.display()));
        let fp = std::fs::File::open(&self.image)
            .wrap_err(format!("Can't open image {}", self.image.display()))?;
        let buffer = unsafe { MmapOptions::new().map(&fp)? };
        let image = StateImage::new(&buffer)?;

        let progress = progress.leave();
        progress.single("Sections parsed");

        println!("{:?}", image.header());

        let kinfo = image.get_kernel_info()?;
        let machine = image.get_machine()?;
        println!(
            "kernel release {} version {}",
            kinfo.release_str(),
            kinfo.version_str()
        );
        println!("code  {:#010x}, size {:#x}", kinfo.code_base, kinfo.code_size);
        println!("data  {:#010x}, size {:#x}", kinfo.data_base, kinfo.data_size);
        println!("procs {:#x}, params {:#x}", kinfo.proc_addr, kinfo.params_base);
        println!(
            "{} bus, {} processor, {} mode",
            if machine.pc_at != 0 { "AT" } else { "XT" },
            machine.processor,
            if machine.protected != 0 { "protected" } else { "real" },
        );

        let procs = image.get_proc_table()?;
        let boot = image.get_image_table()?;
        let hooks = image.get_irq_hooks()?;
        let chunks = image.get_mem_chunks()?;
        println!(
            "{} process slots in use, {} boot image entries, {} irq hooks",
            procs.occupied().count(),
            boot.used().count(),
            hooks.hooks().iter().filter(|hook| hook.in_use()).count(),
        );
        println!("{}K of chunk memory free", click_to_kb(chunks.total_clicks()));
        Ok(())
    }

}
