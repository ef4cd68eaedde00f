use super::LogError;
use log::LevelFilter;
use log4rs::config::Logger;
use std::{collections::BTreeMap, env, mem, str::FromStr};

/// A single `target=level` directive resolved against the active appenders
#[derive(Clone, Debug)]
pub(super) struct LoggerSpec {
    pub name: String,
    pub level: LevelFilter,
    pub appenders: Vec<&'static str>,
}

impl LoggerSpec {
    pub fn logger(&self) -> Logger {
        Logger::builder().appenders(self.appenders.iter().map(|x| x.to_string())).additive(false).build(self.name.clone(), self.level)
    }
}

pub(super) struct Loggers {
    loggers: Vec<LoggerSpec>,
    root_level: LevelFilter,
    rejected: Vec<LogError>,
}

impl Loggers {
    pub fn root_level(&self) -> LevelFilter {
        self.root_level
    }

    pub fn items(&self) -> impl Iterator<Item = Logger> + '_ {
        self.loggers.iter().map(|x| x.logger())
    }

    /// Directives that could not be parsed. They are reported once the logger is live.
    pub fn rejected(&self) -> &[LogError] {
        &self.rejected
    }
}

/// Parses filter expressions of the form `info,satledger_ledger=trace,satledger_codec`.
///
/// A bare level sets the root level, a bare target enables every level for it.
pub(super) struct Builder {
    appenders: Vec<&'static str>,
    loggers: BTreeMap<String, LevelFilter>,
    root_level: Option<LevelFilter>,
    rejected: Vec<LogError>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder { appenders: vec![], loggers: BTreeMap::new(), root_level: None, rejected: vec![] }
    }

    pub fn parse_env(&mut self, env: &str) -> &mut Self {
        self.parse_expression(&env::var(env).unwrap_or_default())
    }

    pub fn parse_expression(&mut self, expression: &str) -> &mut Self {
        for spec in expression.split(',').map(|x| x.trim()).filter(|x| !x.is_empty()) {
            match Self::parse_directive(spec) {
                Ok((level, Some(name))) => {
                    self.loggers.insert(name.to_string(), level);
                }
                Ok((level, None)) => {
                    self.root_level.replace(level);
                }
                Err(err) => self.rejected.push(err),
            }
        }
        self
    }

    fn parse_directive(spec: &str) -> Result<(LevelFilter, Option<&str>), LogError> {
        let mut parts = spec.split('=');
        match (parts.next(), parts.next().map(|x| x.trim()), parts.next()) {
            (Some(part0), None, None) => match part0.parse() {
                Ok(level) => Ok((level, None)),
                Err(_) => Ok((LevelFilter::max(), Some(part0))),
            },
            (Some(part0), Some(""), None) => Ok((LevelFilter::max(), Some(part0))),
            (Some(part0), Some(part1), None) => {
                part1.parse().map(|level| (level, Some(part0))).map_err(|_| LogError::ParseLoggerSpec(part1.to_string()))
            }
            _ => Err(LogError::ParseLoggerSpec(spec.to_string())),
        }
    }

    pub fn appenders(&mut self, appenders: impl IntoIterator<Item = &'static str>) -> &mut Self {
        self.appenders = appenders.into_iter().collect();
        self
    }

    pub fn root_level(&mut self, root_level: LevelFilter) -> &mut Self {
        self.root_level.replace(root_level);
        self
    }

    pub fn build(&mut self) -> Loggers {
        let appenders = self.appenders.clone();
        let loggers = mem::take(&mut self.loggers)
            .into_iter()
            .map(|(name, level)| LoggerSpec { name, level, appenders: appenders.clone() })
            .collect::<Vec<_>>();
        Loggers { loggers, root_level: self.root_level.take().unwrap_or(LevelFilter::Error), rejected: mem::take(&mut self.rejected) }
    }
}

impl FromStr for Builder {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = Self::new();
        builder.parse_expression(s);
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expression() {
        let loggers = Builder::new().parse_expression("warn, satledger_ledger=trace ,satledger_codec,bogus=loud").build();
        assert_eq!(loggers.root_level(), LevelFilter::Warn);

        let specs: Vec<_> = loggers.loggers.iter().map(|s| (s.name.as_str(), s.level)).collect();
        assert_eq!(specs, vec![("satledger_codec", LevelFilter::max()), ("satledger_ledger", LevelFilter::Trace)]);
        assert_eq!(loggers.rejected().len(), 1);
    }

    #[test]
    fn test_default_root_level() {
        let loggers = Builder::new().parse_expression("").build();
        assert_eq!(loggers.root_level(), LevelFilter::Error);
        assert!(loggers.items().next().is_none());
    }

    #[test]
    fn test_later_directives_win() {
        let loggers = "info,debug,satledger_cli=warn,satledger_cli=error".parse::<Builder>().unwrap().build();
        assert_eq!(loggers.root_level(), LevelFilter::Debug);
        assert_eq!(loggers.loggers.len(), 1);
        assert_eq!(loggers.loggers[0].level, LevelFilter::Error);
    }
}
