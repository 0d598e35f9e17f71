mod dump;
mod info;
mod sample;

pub(crate) use dump::Dump as DumpCmd;
pub(crate) use info::Info as InfoCmd;
pub(crate) use sample::Sample as SampleCmd;
