//! Status helper enum mapping to the SMALLINT `scan_statuses` lookup table.
//!
//! The enum discriminants match the seed data order (1-based) in the
//! migration; the names match the wire form used in list filters and
//! API responses.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Scan lifecycle status. `Completed`, `Failed`, and `Stopped` are
    /// terminal; no transition leaves them.
    ScanStatus {
        Pending = 1,
        Running = 2,
        Completed = 3,
        Failed = 4,
        Stopped = 5,
    }
}

impl ScanStatus {
    /// Wire form used in filters and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }

    /// Parse the wire form. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Resolve a status ID back to the enum. Returns `None` for ids not
    /// present in the lookup table.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Running),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            5 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_status_ids_match_seed_data() {
        assert_eq!(ScanStatus::Pending.id(), 1);
        assert_eq!(ScanStatus::Running.id(), 2);
        assert_eq!(ScanStatus::Completed.id(), 3);
        assert_eq!(ScanStatus::Failed.id(), 4);
        assert_eq!(ScanStatus::Stopped.id(), 5);
    }

    #[test]
    fn name_roundtrip() {
        for status in [
            ScanStatus::Pending,
            ScanStatus::Running,
            ScanStatus::Completed,
            ScanStatus::Failed,
            ScanStatus::Stopped,
        ] {
            assert_eq!(ScanStatus::from_name(status.as_str()), Some(status));
            assert_eq!(ScanStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(ScanStatus::from_name("paused"), None);
        assert_eq!(ScanStatus::from_id(99), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ScanStatus::Pending.is_terminal());
        assert!(!ScanStatus::Running.is_terminal());
        assert!(ScanStatus::Completed.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
        assert!(ScanStatus::Stopped.is_terminal());
    }
}
