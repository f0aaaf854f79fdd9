// tests/limiter/fixtures/recording_sink.rs

// dependencies
use async_trait::async_trait;
use parking_lot::Mutex;
use window_limiter::ContactError;
use window_limiter::contact::{ContactForm, ContactSink};

// Sink that keeps every delivered form, optionally failing each delivery
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<ContactForm>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn delivered(&self) -> Vec<ContactForm> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl ContactSink for RecordingSink {
    async fn deliver(&self, form: &ContactForm) -> Result<(), ContactError> {
        if self.fail {
            return Err(ContactError::Delivery("relay unreachable".to_string()));
        }
        self.delivered.lock().push(form.clone());
        Ok(())
    }
}
