#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Debug,
    Info,
    Warn,
}

/// Side effects requested by [`crate::update`]; the front end decides how to render them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Report { level: ReportLevel, line: String },
}

impl Effect {
    pub(crate) fn info(line: impl Into<String>) -> Self {
        Effect::Report {
            level: ReportLevel::Info,
            line: line.into(),
        }
    }

    pub(crate) fn warn(line: impl Into<String>) -> Self {
        Effect::Report {
            level: ReportLevel::Warn,
            line: line.into(),
        }
    }

    pub(crate) fn debug(line: impl Into<String>) -> Self {
        Effect::Report {
            level: ReportLevel::Debug,
            line: line.into(),
        }
    }
}
