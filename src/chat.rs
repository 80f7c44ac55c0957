//! Telegram implementation of the sender's chat client.

use async_trait::async_trait;
use grammers_client::types::peer::Peer;
use grammers_client::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sender::ChatClient;
use crate::session::{get_client, SessionLock, TelegramClient};

/// How a normalized group identifier is looked up.
#[derive(Debug, PartialEq, Eq)]
enum Lookup<'a> {
    /// `@handle` or a bare word that can be a public username.
    Username(&'a str),
    /// Numeric id as Telegram clients show it.
    PeerId(MarkedId),
    /// Anything else: matched against dialog titles.
    Title(&'a str),
}

fn classify(identifier: &str) -> Lookup<'_> {
    if let Some(username) = identifier.strip_prefix('@') {
        Lookup::Username(username)
    } else if let Ok(id) = identifier.parse::<i64>() {
        Lookup::PeerId(unmark(id))
    } else if is_username(identifier) {
        Lookup::Username(identifier)
    } else {
        Lookup::Title(identifier)
    }
}

/// Telegram usernames: 5..=32 chars of `[A-Za-z0-9_]`, starting with a letter.
fn is_username(value: &str) -> bool {
    (5..=32).contains(&value.len())
        && value.starts_with(|c: char| c.is_ascii_alphabetic())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Offset added to channel ids in the `-100…` form.
const CHANNEL_MARK: i64 = 1_000_000_000_000;

/// Raw TL id tagged with the kind of peer it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkedId {
    User(i64),
    Chat(i64),
    Channel(i64),
}

/// Split a marked id: positive for users, `-N` for basic groups,
/// `-100N` for channels and supergroups.
fn unmark(id: i64) -> MarkedId {
    if id >= 0 {
        return MarkedId::User(id);
    }
    let abs = id.saturating_neg();
    if abs > CHANNEL_MARK {
        MarkedId::Channel(abs - CHANNEL_MARK)
    } else {
        MarkedId::Chat(abs)
    }
}

fn peer_id(peer: &Peer) -> MarkedId {
    use grammers_tl_types::enums::Chat;

    match peer {
        Peer::User(u) => MarkedId::User(u.raw.id()),
        Peer::Group(g) => match &g.raw {
            Chat::Empty(c) => MarkedId::Chat(c.id),
            Chat::Chat(c) => MarkedId::Chat(c.id),
            Chat::Forbidden(c) => MarkedId::Chat(c.id),
            // Supergroups are channels on the wire.
            Chat::Channel(c) => MarkedId::Channel(c.id),
            Chat::ChannelForbidden(c) => MarkedId::Channel(c.id),
        },
        Peer::Channel(c) => MarkedId::Channel(c.raw.id),
    }
}

fn peer_title(peer: &Peer) -> String {
    match peer {
        Peer::User(u) => u.full_name(),
        Peer::Group(g) => g.title().unwrap_or("Group").to_string(),
        Peer::Channel(c) => c.title().to_string(),
    }
}

/// Scan the dialog list for a peer matching `lookup`.
async fn find_in_dialogs(client: &Client, lookup: &Lookup<'_>) -> Result<Option<Peer>> {
    let mut dialogs = client.iter_dialogs();
    while let Some(dialog) = dialogs.next().await? {
        let found = match lookup {
            Lookup::PeerId(id) => peer_id(&dialog.peer) == *id,
            Lookup::Title(title) | Lookup::Username(title) => {
                peer_title(&dialog.peer).to_lowercase() == title.to_lowercase()
            }
        };
        if found {
            return Ok(Some(dialog.peer));
        }
    }
    Ok(None)
}

/// Sender backed by a grammers session.
///
/// Holds the session lock for as long as it is connected. Calls from
/// concurrent workers are serialized on one connection.
pub struct TelegramChatClient {
    config: Config,
    lock: Option<SessionLock>,
    client: Option<TelegramClient>,
    send_gate: Mutex<()>,
}

impl TelegramChatClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            lock: None,
            client: None,
            send_gate: Mutex::new(()),
        }
    }

    fn client(&self) -> Result<&TelegramClient> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::ConnectionError("not connected".to_string()))
    }
}

#[async_trait]
impl ChatClient for TelegramChatClient {
    type Entity = Peer;

    async fn connect(&mut self, phone: &str) -> Result<()> {
        let lock = SessionLock::acquire(&self.config.lock_file)?;
        let client = get_client(&self.config).await?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| Error::ConnectionError(e.to_string()))?;
        if !authorized {
            client.shutdown();
            return Err(Error::AuthorizationRequired);
        }

        info!(%phone, session = %self.config.session_file(), "Telegram session ready");
        self.lock = Some(lock);
        self.client = Some(client);
        Ok(())
    }

    async fn resolve(&self, identifier: &str) -> Result<Peer> {
        let client = self.client()?;
        let _gate = self.send_gate.lock().await;
        let lookup = classify(identifier);
        debug!(?lookup, "Resolving group");

        let not_found = |reason: String| Error::ResolutionFailed {
            target: identifier.to_string(),
            reason,
        };

        if let Lookup::Username(username) = lookup {
            match client.resolve_username(username).await {
                Ok(Some(peer)) => return Ok(peer),
                Ok(None) => {}
                Err(e) => return Err(not_found(e.to_string())),
            }
        }

        find_in_dialogs(client, &lookup)
            .await
            .map_err(|e| not_found(e.to_string()))?
            .ok_or_else(|| not_found("no matching chat".to_string()))
    }

    async fn send(&self, entity: &Peer, text: &str) -> Result<()> {
        let client = self.client()?;
        let _gate = self.send_gate.lock().await;
        client
            .send_message(entity, text)
            .await
            .map(|_| ())
            .map_err(|e| Error::DeliveryFailed {
                target: peer_title(entity),
                reason: e.to_string(),
            })
    }

    async fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            client.shutdown();
            info!("Disconnected from Telegram");
        }
        if let Some(mut lock) = self.lock.take() {
            lock.release();
        }
    }
}
