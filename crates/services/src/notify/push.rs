use backbook_config::PushSettings;
use serde_json::Value;
use tracing::warn;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder,
    WebPushClient, WebPushError, WebPushMessageBuilder,
};

/// VAPID-signed Web Push delivery. Disabled unless a private key is
/// configured; delivery failures are logged and swallowed.
pub struct PushSender {
    client: Option<IsahcWebPushClient>,
    private_pem: Option<String>,
    subject: Option<String>,
}

impl PushSender {
    pub fn new(settings: &PushSettings) -> Self {
        let client = settings
            .vapid_private_pem
            .as_ref()
            .and_then(|_| IsahcWebPushClient::new().ok());
        Self {
            client,
            private_pem: settings.vapid_private_pem.clone(),
            subject: settings.vapid_subject.clone(),
        }
    }

    /// `subscription_json` is the PushSubscription document the browser
    /// handed the frontend, stored verbatim on the user.
    pub async fn send(&self, subscription_json: &str, payload: &Value) {
        let (Some(client), Some(pem)) = (&self.client, &self.private_pem) else {
            return;
        };
        let Ok(subscription) = serde_json::from_str::<SubscriptionInfo>(subscription_json)
        else {
            warn!("Stored push subscription is not a valid subscription document");
            return;
        };

        let body = payload.to_string();
        let result: Result<(), WebPushError> = async {
            let mut signature =
                VapidSignatureBuilder::from_pem(pem.as_bytes(), &subscription)?;
            if let Some(subject) = &self.subject {
                signature.add_claim("sub", subject.clone());
            }

            let mut builder = WebPushMessageBuilder::new(&subscription);
            builder.set_payload(ContentEncoding::Aes128Gcm, body.as_bytes());
            builder.set_vapid_signature(signature.build()?);

            client.send(builder.build()?).await
        }
        .await;

        if let Err(e) = result {
            warn!(error = %e, "Web push delivery failed");
        }
    }
}
