//! Shell command parsing
//!
//! One command per input line. Playlist positions are 1-based on the command
//! line. `add` takes `|`-separated fields so titles and artists may contain
//! spaces:
//!
//! ```text
//! add Imagine | John Lennon | 3:03 | 5
//! ```

use crate::error::CommandError;
use playwise_core::human_time::parse_duration;
use playwise_core::sorting::{SortAlgorithm, SortCriteria, SortKey, SortOrder};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_LIST_COUNT: usize = 5;
const DEFAULT_HISTORY_COUNT: usize = 10;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        title: String,
        artist: String,
        duration_secs: u32,
        rating: Option<u8>,
    },
    List,
    Play {
        id: String,
        listened_secs: Option<u64>,
    },
    Undo,
    Rate {
        id: String,
        rating: u8,
    },
    /// 1-based positions
    Move {
        from: usize,
        to: usize,
    },
    Reverse,
    /// Drop the track at a 1-based playlist position (playlist only)
    Delete {
        position: usize,
    },
    /// Remove a track from the whole library
    Remove {
        id: String,
    },
    Sort {
        criteria: SortCriteria,
        algorithm: SortAlgorithm,
    },
    Search {
        keyword: String,
    },
    Top {
        count: usize,
    },
    Favorites {
        count: usize,
    },
    History {
        count: usize,
    },
    Dashboard {
        json: bool,
    },
    Export {
        path: PathBuf,
    },
    Import {
        path: PathBuf,
    },
    ExportHistory {
        path: PathBuf,
    },
    ImportHistory {
        path: PathBuf,
    },
    /// Write the text dashboard to a file
    Report {
        path: PathBuf,
    },
    /// Write catalog, history and report into a folder (data folder when `None`)
    Save {
        dir: Option<PathBuf>,
    },
    /// Read catalog and history back from a folder (data folder when `None`)
    Load {
        dir: Option<PathBuf>,
    },
    Dedupe,
    Shuffle,
    Rebalance,
    Sample,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  add <title> | <artist> | <M:SS> [| <rating>]   Add a track to the library
  list                                           Show the playlist
  play <id> [seconds]                            Play a track
  undo                                           Undo the last play
  rate <id> <1-5>                                Rate a track
  move <from> <to>                               Move a playlist entry (1-based)
  reverse                                        Reverse the playlist
  delete <position>                              Drop a playlist entry (1-based)
  remove <id>                                    Remove a track from the library
  sort <title|artist|duration|rating|added> [asc|desc] [merge|quick]
  search <keyword>                               Search the catalog
  top [count]                                    Highest rated tracks
  favorites [count]                              Most listened tracks
  history [count]                                Recent plays
  dashboard [json]                               Library statistics
  export <file>                                  Write the catalog to a file
  import <file>                                  Read a catalog file
  export-history <file>                          Write the play history to a file
  import-history <file>                          Read a play history file
  report <file>                                  Write the dashboard to a file
  save [folder]                                  Write catalog, history and report
  load [folder]                                  Read catalog and history back
  dedupe                                         Drop repeated playlist entries
  shuffle                                        Shuffle the playlist
  rebalance                                      Rebalance the rating tree
  sample                                         Load sample tracks
  help                                           Show this list
  quit                                           Exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match word.to_ascii_lowercase().as_str() {
            "add" => parse_add(rest),
            "list" | "ls" => no_args(&args, Command::List, "list"),
            "play" => match args.as_slice() {
                [id] => Ok(Command::Play {
                    id: id.to_string(),
                    listened_secs: None,
                }),
                [id, secs] => Ok(Command::Play {
                    id: id.to_string(),
                    listened_secs: Some(number("seconds", secs)?),
                }),
                _ => Err(CommandError::Usage("play <id> [seconds]")),
            },
            "undo" => no_args(&args, Command::Undo, "undo"),
            "rate" => match args.as_slice() {
                [id, rating] => Ok(Command::Rate {
                    id: id.to_string(),
                    rating: number("rating", rating)?,
                }),
                _ => Err(CommandError::Usage("rate <id> <1-5>")),
            },
            "move" | "mv" => match args.as_slice() {
                [from, to] => Ok(Command::Move {
                    from: position("from", from)?,
                    to: position("to", to)?,
                }),
                _ => Err(CommandError::Usage("move <from> <to>")),
            },
            "reverse" => no_args(&args, Command::Reverse, "reverse"),
            "delete" | "del" => match args.as_slice() {
                [pos] => Ok(Command::Delete {
                    position: position("position", pos)?,
                }),
                _ => Err(CommandError::Usage("delete <position>")),
            },
            "remove" | "rm" => match args.as_slice() {
                [id] => Ok(Command::Remove { id: id.to_string() }),
                _ => Err(CommandError::Usage("remove <id>")),
            },
            "sort" => parse_sort(&args),
            "search" | "find" => {
                if rest.is_empty() {
                    Err(CommandError::Usage("search <keyword>"))
                } else {
                    Ok(Command::Search {
                        keyword: rest.to_string(),
                    })
                }
            }
            "top" => Ok(Command::Top {
                count: optional_count(&args, DEFAULT_LIST_COUNT, "top [count]")?,
            }),
            "favorites" | "fav" => Ok(Command::Favorites {
                count: optional_count(&args, DEFAULT_LIST_COUNT, "favorites [count]")?,
            }),
            "history" => Ok(Command::History {
                count: optional_count(&args, DEFAULT_HISTORY_COUNT, "history [count]")?,
            }),
            "dashboard" | "stats" => match args.as_slice() {
                [] => Ok(Command::Dashboard { json: false }),
                ["json"] | ["--json"] => Ok(Command::Dashboard { json: true }),
                _ => Err(CommandError::Usage("dashboard [json]")),
            },
            "export" => path_arg(rest, "export <file>").map(|path| Command::Export { path }),
            "import" => path_arg(rest, "import <file>").map(|path| Command::Import { path }),
            "export-history" => path_arg(rest, "export-history <file>")
                .map(|path| Command::ExportHistory { path }),
            "import-history" => path_arg(rest, "import-history <file>")
                .map(|path| Command::ImportHistory { path }),
            "report" => path_arg(rest, "report <file>").map(|path| Command::Report { path }),
            "save" => Ok(Command::Save {
                dir: optional_path(rest),
            }),
            "load" => Ok(Command::Load {
                dir: optional_path(rest),
            }),
            "dedupe" => no_args(&args, Command::Dedupe, "dedupe"),
            "shuffle" => no_args(&args, Command::Shuffle, "shuffle"),
            "rebalance" => no_args(&args, Command::Rebalance, "rebalance"),
            "sample" => no_args(&args, Command::Sample, "sample"),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn no_args(args: &[&str], command: Command, usage: &'static str) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::Usage(usage))
    }
}

fn parse_add(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "add <title> | <artist> | <M:SS> [| <rating>]";
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let (title, artist, duration, rating) = match fields.as_slice() {
        [title, artist, duration] => (*title, *artist, *duration, None),
        [title, artist, duration, rating] => (*title, *artist, *duration, Some(*rating)),
        _ => return Err(CommandError::Usage(USAGE)),
    };
    if title.is_empty() || artist.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }

    let duration_secs = parse_duration(duration)
        .and_then(|secs| u32::try_from(secs).ok())
        .filter(|&secs| secs > 0)
        .ok_or_else(|| CommandError::InvalidArgument {
            name: "duration",
            value: duration.to_string(),
        })?;
    let rating = rating.map(|r| number::<u8>("rating", r)).transpose()?;

    Ok(Command::Add {
        title: title.to_string(),
        artist: artist.to_string(),
        duration_secs,
        rating,
    })
}

fn parse_sort(args: &[&str]) -> Result<Command, CommandError> {
    const USAGE: &str = "sort <title|artist|duration|rating|added> [asc|desc] [merge|quick]";
    let Some((key, options)) = args.split_first() else {
        return Err(CommandError::Usage(USAGE));
    };
    let key: SortKey = key.parse().map_err(|_| CommandError::InvalidArgument {
        name: "sort key",
        value: key.to_string(),
    })?;

    let mut order = SortOrder::default();
    let mut algorithm = SortAlgorithm::default();
    for option in options {
        if let Ok(parsed) = option.parse::<SortOrder>() {
            order = parsed;
        } else if let Ok(parsed) = option.parse::<SortAlgorithm>() {
            algorithm = parsed;
        } else {
            return Err(CommandError::InvalidArgument {
                name: "sort option",
                value: option.to_string(),
            });
        }
    }

    Ok(Command::Sort {
        criteria: SortCriteria::new(key, order),
        algorithm,
    })
}

fn number<T: FromStr>(name: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        name,
        value: value.to_string(),
    })
}

/// 1-based position; 0 is rejected
fn position(name: &'static str, value: &str) -> Result<usize, CommandError> {
    match number::<usize>(name, value)? {
        0 => Err(CommandError::InvalidArgument {
            name,
            value: value.to_string(),
        }),
        n => Ok(n),
    }
}

fn optional_count(args: &[&str], default: usize, usage: &'static str) -> Result<usize, CommandError> {
    match args {
        [] => Ok(default),
        [count] => number("count", count),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn path_arg(rest: &str, usage: &'static str) -> Result<PathBuf, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(PathBuf::from(rest))
    }
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let command: Command = "add Imagine | John Lennon | 3:03 | 5".parse().unwrap();
        assert_eq!(
            command,
            Command::Add {
                title: "Imagine".to_string(),
                artist: "John Lennon".to_string(),
                duration_secs: 183,
                rating: Some(5),
            }
        );
        let unrated: Command = "add Song | Band | 90".parse().unwrap();
        assert!(matches!(unrated, Command::Add { duration_secs: 90, rating: None, .. }));
    }

    #[test]
    fn test_parse_add_rejects_bad_fields() {
        assert!(matches!("add Imagine | John Lennon".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("add  | Band | 1:00".parse::<Command>(), Err(CommandError::Usage(_))));
        assert_eq!(
            "add Song | Band | 1:99".parse::<Command>(),
            Err(CommandError::InvalidArgument {
                name: "duration",
                value: "1:99".to_string()
            })
        );
        assert!("add Song | Band | 0:00".parse::<Command>().is_err());
        assert!("add Song | Band | 1:00 | five".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_play() {
        assert_eq!(
            "play song_001".parse::<Command>().unwrap(),
            Command::Play {
                id: "song_001".to_string(),
                listened_secs: None
            }
        );
        assert_eq!(
            "PLAY song_001 42".parse::<Command>().unwrap(),
            Command::Play {
                id: "song_001".to_string(),
                listened_secs: Some(42)
            }
        );
        assert!("play".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_positions_are_one_based() {
        assert_eq!("move 1 3".parse::<Command>().unwrap(), Command::Move { from: 1, to: 3 });
        assert!("move 0 3".parse::<Command>().is_err());
        assert!("delete -1".parse::<Command>().is_err());
        assert_eq!("delete 2".parse::<Command>().unwrap(), Command::Delete { position: 2 });
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            "sort duration desc quick".parse::<Command>().unwrap(),
            Command::Sort {
                criteria: SortCriteria::descending(SortKey::Duration),
                algorithm: SortAlgorithm::Quick,
            }
        );
        assert_eq!(
            "sort title".parse::<Command>().unwrap(),
            Command::Sort {
                criteria: SortCriteria::ascending(SortKey::Title),
                algorithm: SortAlgorithm::Merge,
            }
        );
        assert!("sort bpm".parse::<Command>().is_err());
        assert!("sort title sideways".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_counts_and_flags() {
        assert_eq!("top".parse::<Command>().unwrap(), Command::Top { count: 5 });
        assert_eq!("history 3".parse::<Command>().unwrap(), Command::History { count: 3 });
        assert_eq!("favorites".parse::<Command>().unwrap(), Command::Favorites { count: 5 });
        assert_eq!("dashboard json".parse::<Command>().unwrap(), Command::Dashboard { json: true });
        assert!("top many".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_search_keeps_spaces() {
        assert_eq!(
            "search  the beatles ".parse::<Command>().unwrap(),
            Command::Search {
                keyword: "the beatles".to_string()
            }
        );
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            "export /tmp/my catalog.txt".parse::<Command>().unwrap(),
            Command::Export {
                path: PathBuf::from("/tmp/my catalog.txt")
            }
        );
        assert!("import".parse::<Command>().is_err());
        assert_eq!(
            "EXPORT-HISTORY plays.txt".parse::<Command>().unwrap(),
            Command::ExportHistory {
                path: PathBuf::from("plays.txt")
            }
        );
        assert!("import-history".parse::<Command>().is_err());
        assert!("report".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_save_and_load_folder_is_optional() {
        assert_eq!("save".parse::<Command>().unwrap(), Command::Save { dir: None });
        assert_eq!(
            "load /tmp/backup".parse::<Command>().unwrap(),
            Command::Load {
                dir: Some(PathBuf::from("/tmp/backup"))
            }
        );
    }

    #[test]
    fn test_unknown_and_no_arg_commands() {
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
        assert!("reverse now".parse::<Command>().is_err());
    }
}
