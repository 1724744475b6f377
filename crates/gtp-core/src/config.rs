use anyhow::bail;

/// Parsed `key=value,key=value` engine options (spec.md §6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub slave_port: u16,
    pub proxy_port: Option<u16>,
    pub max_slaves: usize,
    pub slaves_quit: bool,
}

const DEFAULT_MAX_SLAVES: usize = 100;

impl Config {
    /// Parses the comma-separated option string the GTP driver hands the
    /// engine at startup. Unknown keys are warned about and ignored; a
    /// missing `slave_port` is fatal.
    pub fn parse(options: &str) -> anyhow::Result<Config> {
        let mut slave_port = None;
        let mut proxy_port = None;
        let mut max_slaves = DEFAULT_MAX_SLAVES;
        let mut slaves_quit = false;

        for pair in options.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None => {
                    log::warn!("ignoring malformed config pair: {:?}", pair);
                    continue;
                }
            };
            match key.trim() {
                "slave_port" => slave_port = Some(value.trim().parse()?),
                "proxy_port" => proxy_port = Some(value.trim().parse()?),
                "max_slaves" => max_slaves = value.trim().parse()?,
                "slaves_quit" => slaves_quit = is_truthy(value.trim()),
                other => log::warn!("unknown config key {:?}, ignoring", other),
            }
        }

        let slave_port = match slave_port {
            Some(port) => port,
            None => bail!("missing required config key: slave_port"),
        };

        Ok(Config {
            slave_port,
            proxy_port,
            max_slaves,
            slaves_quit,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_only() {
        let config = Config::parse("slave_port=1234").unwrap();
        assert_eq!(config.slave_port, 1234);
        assert_eq!(config.proxy_port, None);
        assert_eq!(config.max_slaves, DEFAULT_MAX_SLAVES);
        assert!(!config.slaves_quit);
    }

    #[test]
    fn parses_full_set() {
        let config = Config::parse("slave_port=1234,proxy_port=1235,max_slaves=8,slaves_quit=true").unwrap();
        assert_eq!(config.slave_port, 1234);
        assert_eq!(config.proxy_port, Some(1235));
        assert_eq!(config.max_slaves, 8);
        assert!(config.slaves_quit);
    }

    #[test]
    fn missing_slave_port_is_fatal() {
        assert!(Config::parse("max_slaves=8").is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = Config::parse("slave_port=1,frobnicate=yes").unwrap();
        assert_eq!(config.slave_port, 1);
    }

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "TRUE", "yes", "on"] {
            assert!(is_truthy(v), "{v} should be truthy");
        }
        for v in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(v), "{v} should not be truthy");
        }
    }
}
