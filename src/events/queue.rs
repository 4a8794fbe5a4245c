use tokio::sync::mpsc;

/// Inbound chat requests, one per pipeline invocation.
#[derive(Debug, Clone)]
pub enum Event {
    ScheduleRequested {
        text: String,
        user_id: String,
        channel_id: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::Sender<Event>,
}

impl EventBus {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    pub async fn emit(&self, event: Event) {
        let _ = self.tx.send(event).await;
    }
}
