//! Line commands for the interactive shell.

use std::path::PathBuf;

use crate::backend_bridge::commands::BackendCommand;

pub const HELP: &str = "\
commands:
  page                         load every panel
  refresh                      reload system info and documents
  ask <question>               query the indexed documents
  wb-ask <question>            query the World Bank knowledge base
  upload [path]                upload a document
  update <c1,c2> <i1,i2> [--no-topics]
                               update the World Bank knowledge base
  save <path>                  write the assembled page to a file
  help                         show this message
  quit                         leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Backend(BackendCommand),
    Save(PathBuf),
    Help,
    Quit,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "page" => ShellCommand::Backend(BackendCommand::LoadPage),
        "refresh" => ShellCommand::Backend(BackendCommand::Refresh),
        "ask" => ShellCommand::Backend(BackendCommand::Ask {
            question: rest.to_string(),
        }),
        "wb-ask" | "worldbank-ask" => ShellCommand::Backend(BackendCommand::AskWorldBank {
            question: rest.to_string(),
        }),
        "upload" => ShellCommand::Backend(BackendCommand::Upload {
            path: (!rest.is_empty()).then(|| PathBuf::from(rest)),
        }),
        "update" => {
            let mut include_topics = true;
            let mut lists = Vec::new();
            for token in rest.split_whitespace() {
                if token == "--no-topics" {
                    include_topics = false;
                } else {
                    lists.push(token);
                }
            }
            if lists.len() > 2 {
                return Err("usage: update <c1,c2> <i1,i2> [--no-topics]".to_string());
            }
            ShellCommand::Backend(BackendCommand::UpdateKnowledge {
                countries: split_list(lists.first().copied()),
                indicators: split_list(lists.get(1).copied()),
                include_topics,
            })
        }
        "save" if !rest.is_empty() => ShellCommand::Save(PathBuf::from(rest)),
        "save" => return Err("usage: save <path>".to_string()),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_questions_verbatim() {
        assert_eq!(
            parse_line("ask   What is GDP?  ").expect("parse"),
            Some(ShellCommand::Backend(BackendCommand::Ask {
                question: "What is GDP?".into()
            }))
        );
        assert_eq!(
            parse_line("wb-ask inflation in Senegal").expect("parse"),
            Some(ShellCommand::Backend(BackendCommand::AskWorldBank {
                question: "inflation in Senegal".into()
            }))
        );
    }

    #[test]
    fn upload_without_path_is_forwarded_for_validation() {
        assert_eq!(
            parse_line("upload").expect("parse"),
            Some(ShellCommand::Backend(BackendCommand::Upload { path: None }))
        );
    }

    #[test]
    fn update_splits_comma_lists_and_topic_flag() {
        assert_eq!(
            parse_line("update FRA,SEN NY.GDP.MKTP.CD --no-topics").expect("parse"),
            Some(ShellCommand::Backend(BackendCommand::UpdateKnowledge {
                countries: vec!["FRA".into(), "SEN".into()],
                indicators: vec!["NY.GDP.MKTP.CD".into()],
                include_topics: false,
            }))
        );
        assert_eq!(
            parse_line("update FRA").expect("parse"),
            Some(ShellCommand::Backend(BackendCommand::UpdateKnowledge {
                countries: vec!["FRA".into()],
                indicators: Vec::new(),
                include_topics: true,
            }))
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_line("   ").expect("parse"), None);
        assert!(parse_line("launch rockets").is_err());
        assert!(parse_line("save").is_err());
        assert_eq!(parse_line("QUIT").expect("parse"), Some(ShellCommand::Quit));
    }
}
