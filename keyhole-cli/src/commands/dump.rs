use clap::Clap;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use memmap::MmapOptions;

use keyhole_dump::dumper::Dumper;
use keyhole_dump::fkey::Fkey;
use keyhole_dump::report::DumpReport;
use keyhole_image::StateImage;

use crate::helpers;

/// Send a function key to a state image and print the dump.
#[derive(Clap, Debug)]
pub(crate) struct Dump {
    /// State image path
    #[clap(parse(from_os_str))]
    pub image: std::path::PathBuf,

    /// Function key to send
    #[clap(long, short,
        possible_values(&["f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12"]),
        default_value="f1")]
    pub key: Fkey,

    /// Press the key this many times
    #[clap(long, default_value="1")]
    pub repeat: usize,

    /// Save the rendered pages as a JSON report
    #[clap(long, parse(from_os_str))]
    pub save: Option<std::path::PathBuf>,
}

impl Dump {

    pub(crate) fn run(&self) -> Result<(), Report> {
        let progress = helpers::start();
        let progress = progress.enter("Dumping kernel state");

        progress.single(format!("Mapping {}", self.image.display()));
        let fp = std::fs::File::open(&self.image)
            .wrap_err(format!("Can't open image {}", self.image.display()))?;
        let buffer = unsafe { MmapOptions::new().map(&fp)? };
        let image = StateImage::new(&buffer)?;

        let mut dumper = Dumper::new(image);
        let mut report = self.save.as_ref().map(|_| DumpReport::new(&self.key.to_string()));

        progress.single(format!("Pressing {} {} times", self.key, self.repeat));
        let progress = progress.leave();

        for _ in 0..self.repeat {
            match dumper.on_key(self.key.code()) {
                Some(page) => {
                    print!("{}", page.text());
                    if let Some(report) = report.as_mut() {
                        report.push(page);
                    }
                }
                None => println!("({} is not bound to a dump)", self.key),
            }
        }

        if let (Some(report), Some(path)) = (report, self.save.as_ref()) {
            report.save(path)?;
            progress.single(format!("Report saved to {}", path.display()));
        }

        Ok(())
    }

}
