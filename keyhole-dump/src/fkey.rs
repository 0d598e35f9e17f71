//! Function keys and their dump bindings.

use std::str::FromStr;

use keyhole_core::error::GenericError;

/// A console function key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Fkey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl Fkey {

    /// Decode a notification key code, `1` through `12`.
    pub fn from_code(code: u32) -> Option<Self> {
        let key = match code {
            1 => Fkey::F1,
            2 => Fkey::F2,
            3 => Fkey::F3,
            4 => Fkey::F4,
            5 => Fkey::F5,
            6 => Fkey::F6,
            7 => Fkey::F7,
            8 => Fkey::F8,
            9 => Fkey::F9,
            10 => Fkey::F10,
            11 => Fkey::F11,
            12 => Fkey::F12,
            _ => return None,
        };
        Some(key)
    }

    /// The notification key code this key arrives as.
    pub fn code(self) -> u32 {
        match self {
            Fkey::F1 => 1,
            Fkey::F2 => 2,
            Fkey::F3 => 3,
            Fkey::F4 => 4,
            Fkey::F5 => 5,
            Fkey::F6 => 6,
            Fkey::F7 => 7,
            Fkey::F8 => 8,
            Fkey::F9 => 9,
            Fkey::F10 => 10,
            Fkey::F11 => 11,
            Fkey::F12 => 12,
        }
    }

    /// The dump bound to this key, if any.
    pub fn binding(self) -> Option<DumpKind> {
        let kind = match self {
            Fkey::F1 => DumpKind::ProcTab,
            Fkey::F2 => DumpKind::MemMap,
            Fkey::F3 => DumpKind::BootImage,
            Fkey::F4 => DumpKind::SendMask,
            Fkey::F5 => DumpKind::BootParams,
            Fkey::F6 => DumpKind::IrqHooks,
            Fkey::F7 => DumpKind::KernelLog,
            Fkey::F8 => return None,
            Fkey::F9 => DumpKind::Diagnostics,
            Fkey::F10 => DumpKind::KernelEnv,
            Fkey::F11 => DumpKind::MemChunks,
            Fkey::F12 => DumpKind::SchedQueues,
        };
        Some(kind)
    }

}

impl std::fmt::Display for Fkey {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}", self.code())
    }

}

impl FromStr for Fkey {
    type Err = GenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .trim_start_matches(|c| c == 'f' || c == 'F')
            .parse::<u32>()
            .map_err(|_| GenericError::Generic(format!("invalid function key {:?}", s)))?;
        Fkey::from_code(code)
            .ok_or_else(|| GenericError::Generic(format!("invalid function key {:?}", s)))
    }
}

/// The dumps the engine knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// Process table, paginated.
    ProcTab,
    /// Process memory maps, paginated.
    MemMap,
    /// Boot image table.
    BootImage,
    /// Send permission matrix, paginated.
    SendMask,
    /// Boot monitor parameters.
    BootParams,
    /// Interrupt hook table.
    IrqHooks,
    /// Kernel message ring.
    KernelLog,
    /// Locally collected diagnostics.
    Diagnostics,
    /// Kernel environment and machine description.
    KernelEnv,
    /// Free memory chunk list.
    MemChunks,
    /// Scheduling queue contents.
    SchedQueues,
}

impl std::fmt::Display for DumpKind {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DumpKind::ProcTab => "process table",
            DumpKind::MemMap => "memory map",
            DumpKind::BootImage => "boot image",
            DumpKind::SendMask => "send mask",
            DumpKind::BootParams => "boot parameters",
            DumpKind::IrqHooks => "interrupt hooks",
            DumpKind::KernelLog => "kernel messages",
            DumpKind::Diagnostics => "diagnostics",
            DumpKind::KernelEnv => "kernel environment",
            DumpKind::MemChunks => "memory chunks",
            DumpKind::SchedQueues => "scheduling queues",
        };
        f.write_str(name)
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 1..=12 {
            let key = Fkey::from_code(code).unwrap();
            assert_eq!(key.code(), code);
        }
        assert_eq!(Fkey::from_code(0), None);
        assert_eq!(Fkey::from_code(13), None);
    }

    #[test]
    fn parsing_accepts_either_case() {
        assert_eq!("f1".parse::<Fkey>().unwrap(), Fkey::F1);
        assert_eq!("F12".parse::<Fkey>().unwrap(), Fkey::F12);
        assert!("f0".parse::<Fkey>().is_err());
        assert!("f13".parse::<Fkey>().is_err());
        assert!("g2".parse::<Fkey>().is_err());
    }

    #[test]
    fn only_f8_is_unbound() {
        for code in 1..=12 {
            let key = Fkey::from_code(code).unwrap();
            if key == Fkey::F8 {
                assert!(key.binding().is_none());
            } else {
                assert!(key.binding().is_some());
            }
        }
    }

}
