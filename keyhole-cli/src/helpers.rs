use std::fmt;
use std::io::prelude::*;

pub(crate) fn start() -> Progress {
    Progress::Section
}

#[derive(Copy, Clone, Debug)]
pub(crate) enum Progress {
    Section,
    Item,
}

impl Progress {

    pub fn enter<D: fmt::Display>(self, name: D) -> Self {
        emit(":: ", term::color::BLUE, name);
        Progress::Item
    }

    pub fn single<D: fmt::Display>(&self, name: D) {
        emit("  -> ", term::color::GREEN, name);
    }

    pub fn leave(self) -> Self {
        Progress::Section
    }

}

fn emit<D: fmt::Display>(prefix: &str, color: term::color::Color, name: D) {
    match term::stderr() {
        Some(mut t) => {
            let _ = t.fg(color);
            let _ = t.attr(term::Attr::Bold);
            let _ = write!(t, "{}", prefix);
            let _ = t.reset();
            let _ = writeln!(t, "{}", name);
        }
        None => eprintln!("{}{}", prefix, name),
    }
}
