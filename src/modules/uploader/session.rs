//! Upload form state: the selected file, its metadata and the progress/status
//! signal observed by the caller.

use tokio::sync::watch;

use crate::constants::{PUBLISHED_MESSAGE, UPLOADED_MESSAGE};
use crate::modules::uploader::{
    model::{parse_tags, LocalVideoFile, UploadError},
    service::UploaderService,
};
use crate::modules::video::schema::ProcessedVideo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStatus {
    pub is_uploading: bool,
    /// 0 on start, 50 once the raw video is stored, 100 once processed.
    pub progress: u8,
    pub message: Option<StatusMessage>,
    generation: u64,
}

pub struct UploadSession {
    service: UploaderService,
    owner_id: String,
    selected: Option<LocalVideoFile>,
    description: String,
    tags: String,
    status: watch::Sender<UploadStatus>,
}

impl UploadSession {
    pub fn new(service: UploaderService, owner_id: impl Into<String>) -> Self {
        let (status, _) = watch::channel(UploadStatus::default());
        Self {
            service,
            owner_id: owner_id.into(),
            selected: None,
            description: String::new(),
            tags: String::new(),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadStatus> {
        self.status.subscribe()
    }

    #[cfg(test)]
    pub fn status(&self) -> UploadStatus {
        self.status.borrow().clone()
    }

    #[cfg(test)]
    pub fn selected_file(&self) -> Option<&LocalVideoFile> {
        self.selected.as_ref()
    }

    #[cfg(test)]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[cfg(test)]
    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.tags = tags.into();
    }

    /// Rejected files leave the previous selection in place.
    pub fn select_file(&mut self, file: LocalVideoFile) -> Result<(), UploadError> {
        if let Err(e) = self.service.validate(&file) {
            self.show(StatusMessage::Error(e.to_string()));
            self.schedule_clear();
            return Err(e);
        }

        self.selected = Some(file);
        self.status.send_modify(|s| {
            s.message = None;
            s.generation += 1;
        });
        Ok(())
    }

    /// Stores the selected video and triggers processing.
    ///
    /// On failure only the in-progress flag is reset, so the same selection
    /// and metadata can be published again.
    pub async fn publish(&mut self) -> Result<ProcessedVideo, UploadError> {
        let Some(file) = self.selected.as_ref() else {
            let err = UploadError::NoFileSelected;
            self.show(StatusMessage::Error(err.to_string()));
            self.schedule_clear();
            return Err(err);
        };

        self.status.send_modify(|s| {
            s.is_uploading = true;
            s.progress = 0;
            s.message = None;
            s.generation += 1;
        });

        let result = self.run(file).await;

        match &result {
            Ok(_) => {
                self.selected = None;
                self.description.clear();
                self.tags.clear();
            }
            Err(e) => {
                log::error!("Error during upload: {}", e);
                self.show(StatusMessage::Error(format!("Error: {}", e)));
            }
        }

        self.status.send_modify(|s| s.is_uploading = false);
        self.schedule_clear();
        result
    }

    async fn run(&self, file: &LocalVideoFile) -> Result<ProcessedVideo, UploadError> {
        let stored = self.service.upload(file, &self.owner_id).await?;

        self.status.send_modify(|s| {
            s.progress = 50;
            s.message = Some(StatusMessage::Info(UPLOADED_MESSAGE.to_string()));
            s.generation += 1;
        });

        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());
        let processed = self
            .service
            .submit_for_processing(&stored, &self.owner_id, description, parse_tags(&self.tags))
            .await?;

        self.status.send_modify(|s| {
            s.progress = 100;
            s.message = Some(StatusMessage::Info(PUBLISHED_MESSAGE.to_string()));
            s.generation += 1;
        });

        Ok(processed)
    }

    fn show(&self, message: StatusMessage) {
        self.status.send_modify(|s| {
            s.message = Some(message);
            s.generation += 1;
        });
    }

    /// Clears the current message after the display timeout unless a newer
    /// message replaced it in the meantime.
    fn schedule_clear(&self) {
        let generation = {
            let status = self.status.borrow();
            if status.message.is_none() {
                return;
            }
            status.generation
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let sender = self.status.clone();
        let timeout = self.service.config().message_timeout;
        handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            sender.send_if_modified(|s| {
                if s.generation == generation && s.message.is_some() {
                    s.message = None;
                    true
                } else {
                    false
                }
            });
        });
    }
}
