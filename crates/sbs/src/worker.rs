//! Background diff producer
//!
//! Reload requests go to one worker thread; responses carry the request's
//! token so the view can drop the ones that were overtaken.

use crate::producer::{DiffOptions, DiffSource};
use sbs_core::{DiffInfo, ReloadRequest, ReloadToken};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

pub struct ReloadResponse {
    pub token: ReloadToken,
    pub diff: DiffInfo,
}

pub struct ReloadWorker {
    tx: mpsc::Sender<ReloadRequest>,
    rx: mpsc::Receiver<ReloadResponse>,
}

impl ReloadWorker {
    pub fn spawn(source: Arc<DiffSource>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<ReloadRequest>();
        let (resp_tx, resp_rx) = mpsc::channel::<ReloadResponse>();
        thread::spawn(move || {
            while let Ok(req) = req_rx.recv() {
                let diff = source.produce(DiffOptions::from(&req));
                if resp_tx.send(ReloadResponse { token: req.token, diff }).is_err() {
                    break;
                }
            }
        });
        Self {
            tx: req_tx,
            rx: resp_rx,
        }
    }

    pub fn request(&self, request: ReloadRequest) {
        log::debug!("queueing reload {}", request.token.version());
        if self.tx.send(request).is_err() {
            log::warn!("diff worker is gone, reload {} dropped", request.token.version());
        }
    }

    /// Next finished reload, if any
    pub fn try_recv(&self) -> Option<ReloadResponse> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::SourceFile;
    use std::time::Duration;

    #[test]
    fn test_worker_answers_with_token() {
        let source = Arc::new(DiffSource::Files {
            old: Some(SourceFile::new("a.txt", "one\ntwo\n")),
            new: Some(SourceFile::new("a.txt", "one\n2\n")),
        });
        let worker = ReloadWorker::spawn(source);
        let request = ReloadRequest {
            token: ReloadToken::new(3),
            intraline: true,
            ignore_whitespace: false,
        };
        worker.request(request);
        let response = worker.rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(response.token, ReloadToken::new(3));
        assert_eq!(response.diff.content.len(), 2);
        assert!(worker.try_recv().is_none());
    }
}
