/// Lifecycle codes stored in `Source::status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceStatus {
    Archived = 0,
    Active = 1,
}

impl SourceStatus {
    pub fn code(self) -> i8 {
        self as i8
    }
}

impl From<SourceStatus> for i8 {
    fn from(status: SourceStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i8> for SourceStatus {
    type Error = i8;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SourceStatus::Archived),
            1 => Ok(SourceStatus::Active),
            other => Err(other),
        }
    }
}
