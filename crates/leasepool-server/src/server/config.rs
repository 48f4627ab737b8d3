use anyhow::{Context, bail};
use clap::Parser;
use leasepool::ipv4_range;
use std::net::Ipv4Addr;

/// Runtime configuration for the `leasepool-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is honored), with defaults matching a small lab network of ten
/// addresses.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "leasepool-server",
    version,
    about = "An HTTP service leasing IPv4 addresses for a bounded time"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:8080"))]
    pub server_addr: String,

    /// First address of the pool.
    ///
    /// Environment variable: `POOL_START`
    #[arg(long, env = "POOL_START", default_value_t = Ipv4Addr::new(192, 168, 0, 101))]
    pub pool_start: Ipv4Addr,

    /// Number of consecutive addresses in the pool, starting at `POOL_START`.
    ///
    /// Environment variable: `POOL_SIZE`
    #[arg(long, env = "POOL_SIZE", default_value_t = 10)]
    pub pool_size: usize,

    /// Longest lease a client may request, in seconds. Unbounded when unset.
    ///
    /// Environment variable: `MAX_LEASE_SECS`
    #[arg(long, env = "MAX_LEASE_SECS")]
    pub max_lease_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub pool: Vec<Ipv4Addr>,
    pub max_lease_secs: Option<u64>,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.pool_size == 0 {
            bail!("POOL_SIZE must be greater than 0");
        }

        let pool = ipv4_range(args.pool_start, args.pool_size).with_context(|| {
            format!(
                "POOL_SIZE ({}) does not fit after POOL_START ({})",
                args.pool_size, args.pool_start
            )
        })?;

        Ok(Self {
            server_addr: args.server_addr,
            pool,
            max_lease_secs: args.max_lease_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let argv = core::iter::once("leasepool-server").chain(args.iter().copied());
        let args = CliArgs::try_parse_from(argv)?;
        ServerConfig::try_from(args)
    }

    #[test]
    fn defaults_build_ten_addresses() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.pool.len(), 10);
        assert_eq!(config.pool[0], Ipv4Addr::new(192, 168, 0, 101));
        assert_eq!(config.pool[9], Ipv4Addr::new(192, 168, 0, 110));
        assert_eq!(config.max_lease_secs, None);
    }

    #[test]
    fn custom_range() {
        let config = parse(&[
            "--pool-start",
            "10.1.2.250",
            "--pool-size",
            "8",
            "--max-lease-secs",
            "600",
        ])
        .unwrap();
        assert_eq!(config.pool.last(), Some(&Ipv4Addr::new(10, 1, 3, 1)));
        assert_eq!(config.max_lease_secs, Some(600));
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(parse(&["--pool-size", "0"]).is_err());
    }

    #[test]
    fn range_past_broadcast_is_rejected() {
        let err = parse(&["--pool-start", "255.255.255.250", "--pool-size", "7"]).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }
}
