use std::path::PathBuf;
use notify::event::CreateKind;
use notify::{Event, EventKind};

/// A creation notification for one path under the watched source
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub path: PathBuf,
    pub is_directory: bool,
}

impl FileEvent {
    pub fn new(path: PathBuf, is_directory: bool) -> Self {
        Self { path, is_directory }
    }

    pub fn file(path: PathBuf) -> Self {
        Self::new(path, false)
    }

    pub fn directory(path: PathBuf) -> Self {
        Self::new(path, true)
    }

    /// Translate a raw notifier event into creation events.
    ///
    /// Anything other than a create is dropped. When the backend does not
    /// say whether a file or folder was created the path is stat'ed.
    pub fn from_notify(event: &Event) -> Vec<FileEvent> {
        let kind = match event.kind {
            EventKind::Create(kind) => kind,
            _ => return Vec::new(),
        };

        event
            .paths
            .iter()
            .map(|path| {
                let is_directory = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => path.is_dir(),
                };
                FileEvent::new(path.clone(), is_directory)
            })
            .collect()
    }
}
