use crate::dto::UsersParams;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Command {
    Help,
    InitDb(Global),
    Users(Global, UsersParams),
    PhoneAvailable(Global, String),
    Me(Global, i64),
}

/// Options every command accepts.
#[derive(Debug, Clone)]
pub struct Global {
    pub config: PathBuf,
    pub database: Option<String>,
}

impl Default for Global {
    fn default() -> Self {
        Self {
            config: PathBuf::from("accounts.toml"),
            database: None,
        }
    }
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let Some(first) = it.next() else {
        return Ok(Command::Help);
    };

    let mut global = Global::default();
    let mut params = UsersParams::default();
    let mut positional: Vec<&str> = Vec::new();

    while let Some(token) = it.next() {
        let (flag, inline) = match token.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (token, None),
        };
        let mut value = |name: &str| -> anyhow::Result<String> {
            match inline {
                Some(v) => Ok(v.to_string()),
                None => it
                    .next()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("{name} requires a value")),
            }
        };

        match flag {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => global.config = PathBuf::from(value("--config")?),
            "--database" => global.database = Some(value("--database")?),
            "--page" if first == "users" => params.page = Some(parse_int("--page", &value("--page")?)?),
            "--per-page" if first == "users" => {
                params.per_page = Some(parse_int("--per-page", &value("--per-page")?)?)
            }
            "--order-by" if first == "users" => params.order_by = Some(value("--order-by")?),
            "--sort" if first == "users" => params.sort = Some(value("--sort")?),
            "--search" if first == "users" => params.search = Some(value("--search")?),
            _ if flag.starts_with('-') => anyhow::bail!("unknown option for {first}: {flag}"),
            _ => positional.push(token),
        }
    }

    match (first, positional.as_slice()) {
        ("-h" | "--help" | "help", _) => Ok(Command::Help),
        ("init-db", []) => Ok(Command::InitDb(global)),
        ("users", []) => Ok(Command::Users(global, params)),
        ("phone-available", [phone]) => Ok(Command::PhoneAvailable(global, phone.to_string())),
        ("phone-available", _) => anyhow::bail!("phone-available takes exactly one phone number"),
        ("me", [id]) => Ok(Command::Me(global, parse_int("user id", id)?)),
        ("me", _) => anyhow::bail!("me takes exactly one user id"),
        ("init-db" | "users", [extra, ..]) => anyhow::bail!("unexpected argument: {extra}"),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_int(name: &str, raw: &str) -> anyhow::Result<i64> {
    raw.parse()
        .map_err(|_| anyhow::anyhow!("{name} must be an integer, got `{raw}`"))
}

pub fn print_help() {
    println!(
        "\
accounts - user and token service tools

USAGE:
  accounts <COMMAND> [OPTIONS]

COMMANDS:
  init-db                 Create the users and tokens tables
  users                   List users one page at a time
  phone-available <PHONE> Check whether a phone number is still free
  me <ID>                 Show one user

GLOBAL OPTIONS:
  --config <FILE>         Config file path (default: accounts.toml)
  --database <URL>        Override database.url from config
  -h, --help              Print help

USERS OPTIONS:
  --page <N>              Page to show (default from config)
  --per-page <N>          Rows per page
  --order-by <COLUMN>     id, display_name or created_at
  --sort <asc|desc>       Sort direction
  --search <TEXT>         Match display name or phone number"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("accounts")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_prints_help() {
        assert!(matches!(parse_args(&args(&[])).unwrap(), Command::Help));
        assert!(matches!(parse_args(&args(&["users", "-h"])).unwrap(), Command::Help));
    }

    #[test]
    fn users_collects_listing_options() {
        let cmd = parse_args(&args(&[
            "users",
            "--config=dev.toml",
            "--page",
            "2",
            "--per-page=20",
            "--sort",
            "desc",
            "--search",
            "ann",
        ]))
        .unwrap();
        let Command::Users(global, params) = cmd else {
            panic!("expected users");
        };
        assert_eq!(global.config, PathBuf::from("dev.toml"));
        assert_eq!(params.page, Some(2));
        assert_eq!(params.per_page, Some(20));
        assert_eq!(params.sort.as_deref(), Some("desc"));
        assert_eq!(params.search.as_deref(), Some("ann"));
        assert_eq!(params.order_by, None);
    }

    #[test]
    fn positional_arguments() {
        let Command::Me(global, id) = parse_args(&args(&["me", "17"])).unwrap() else {
            panic!("expected me");
        };
        assert_eq!(id, 17);
        assert_eq!(global.config, PathBuf::from("accounts.toml"));

        let Command::PhoneAvailable(_, phone) =
            parse_args(&args(&["phone-available", "+15551234"])).unwrap()
        else {
            panic!("expected phone-available");
        };
        assert_eq!(phone, "+15551234");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["me", "seventeen"])).is_err());
        assert!(parse_args(&args(&["me"])).is_err());
        assert!(parse_args(&args(&["init-db", "--page", "2"])).is_err());
        assert!(parse_args(&args(&["users", "--config"])).is_err());
        assert!(parse_args(&args(&["drop-everything"])).is_err());
    }
}
