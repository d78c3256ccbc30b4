use crate::filter::TableFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Wait for each local midnight and run a cycle.
    Schedule,
    /// Run one cycle now.
    Manual {
        next_day: bool,
        only: Option<TableFilter>,
        seed: Option<u64>,
        dry_run: bool,
    },
    /// Ensure the schema exists, then empty every table.
    Truncate,
    Help,
}

pub const USAGE: &str = "\
usage: energy-simulator [--manual [--next-day] [--only LIST] [--seed N] [--dry-run] | --truncate | --help]

  (no arguments)   run every day at local midnight
  --manual         run one generate-and-load cycle now
    --next-day     generate tomorrow's data instead of today's
    --only LIST    comma separated subset of GEN,LFD,NWP,HG_GEN,HG_MEAS
                   (CURT and KPX are always generated)
    --seed N       reproducible random values
    --dry-run      load into memory only and print each record as JSON
  --truncate       create missing tables, then empty all seven tables
  --help           show this message";

pub fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&args)
}

pub fn parse_args_from(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Ok(Command::Schedule);
    };

    match first.as_str() {
        "--help" | "-h" => Ok(Command::Help),
        "--truncate" => match args.get(1) {
            None => Ok(Command::Truncate),
            Some(other) => Err(format!("unexpected argument after --truncate: {other}")),
        },
        "--manual" => parse_manual(&args[1..]),
        other => Err(format!("unknown argument: {other}")),
    }
}

fn parse_manual(args: &[String]) -> Result<Command, String> {
    let mut i = 0usize;
    let mut next_day = false;
    let mut only = None;
    let mut seed = None;
    let mut dry_run = false;

    while i < args.len() {
        match args[i].as_str() {
            "--next-day" => next_day = true,
            "--dry-run" => dry_run = true,
            "--only" => {
                i += 1;
                let list = args
                    .get(i)
                    .ok_or_else(|| "missing value for --only (expected e.g. GEN,LFD)".to_string())?;
                if only.replace(TableFilter::parse_list(list)).is_some() {
                    return Err("--only provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args
                    .get(i)
                    .ok_or_else(|| "missing value for --seed (expected an integer)".to_string())?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| format!("invalid --seed value: {raw}"))?;
                if seed.replace(value).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Command::Manual {
        next_day,
        only,
        seed,
        dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_client::domain::TableKind;

    fn parse(args: &[&str]) -> Result<Command, String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args_from(&args)
    }

    #[test]
    fn no_arguments_schedules() {
        assert_eq!(parse(&[]), Ok(Command::Schedule));
    }

    #[test]
    fn manual_with_all_options() {
        let cmd = parse(&["--manual", "--next-day", "--only", "hg_gen,Hg_Meas", "--seed", "42", "--dry-run"]).unwrap();
        let Command::Manual {
            next_day,
            only: Some(filter),
            seed,
            dry_run,
        } = cmd
        else {
            panic!("expected manual command with filter");
        };
        assert!(next_day);
        assert!(dry_run);
        assert_eq!(seed, Some(42));
        assert!(filter.synthesizes(TableKind::HgGen));
        assert!(filter.synthesizes(TableKind::HgMeas));
        assert!(!filter.synthesizes(TableKind::Lfd));
    }

    #[test]
    fn unknown_table_names_are_not_an_error() {
        let cmd = parse(&["--manual", "--only", "GEN,WAVES"]).unwrap();
        let Command::Manual { only: Some(filter), .. } = cmd else {
            panic!("expected a filter");
        };
        assert_eq!(filter.ignored(), ["WAVES".to_string()]);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["--manual", "--tomorrow"]).is_err());
        assert!(parse(&["--truncate", "--manual"]).is_err());
    }

    #[test]
    fn missing_values_are_rejected() {
        assert!(parse(&["--manual", "--only"]).is_err());
        assert!(parse(&["--manual", "--seed", "abc"]).is_err());
    }

    #[test]
    fn help_and_truncate() {
        assert_eq!(parse(&["--help"]), Ok(Command::Help));
        assert_eq!(parse(&["--truncate"]), Ok(Command::Truncate));
    }
}
