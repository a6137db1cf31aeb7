//! Backend commands queued from the front end to the backend worker.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadPage,
    Refresh,
    RenderPage,
    Upload {
        path: Option<PathBuf>,
    },
    Ask {
        question: String,
    },
    AskWorldBank {
        question: String,
    },
    UpdateKnowledge {
        countries: Vec<String>,
        indicators: Vec<String>,
        include_topics: bool,
    },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadPage => "load_page",
            BackendCommand::Refresh => "refresh",
            BackendCommand::RenderPage => "render_page",
            BackendCommand::Upload { .. } => "upload",
            BackendCommand::Ask { .. } => "ask",
            BackendCommand::AskWorldBank { .. } => "ask_worldbank",
            BackendCommand::UpdateKnowledge { .. } => "update_knowledge",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
