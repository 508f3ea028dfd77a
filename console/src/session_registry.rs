use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use common::games::grid::{GameError, GridGameState};
use common::{SessionId, log, warn_log};

/// Everything needed to (re)build a session's game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub map_file: PathBuf,
    pub players: usize,
    pub seed: Option<u64>,
}

impl SessionSettings {
    fn build_game(&self) -> Result<GridGameState, GameError> {
        GridGameState::from_map_file(&self.map_file, self.players, self.seed)
    }
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    settings: SessionSettings,
    game: GridGameState,
}

impl Session {
    fn new(id: SessionId, settings: SessionSettings) -> Result<Self, GameError> {
        let game = settings.build_game()?;
        Ok(Self { id, settings, game })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[cfg(test)]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn game(&self) -> &GridGameState {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GridGameState {
        &mut self.game
    }
}

#[derive(Debug)]
pub enum RegistryError {
    AlreadyExists(SessionId),
    NotFound(SessionId),
    NoActiveSession,
    Game { id: SessionId, source: GameError },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyExists(id) => write!(f, "Session ID already exists: {}", id),
            RegistryError::NotFound(id) => write!(f, "Session ID not found: {}", id),
            RegistryError::NoActiveSession => write!(f, "No active session."),
            RegistryError::Game { id, source } => {
                write!(f, "Could not set up session {}: {}", id, source)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Game { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Named, independent games plus the one commands currently go to.
#[derive(Debug)]
pub struct SessionRegistry {
    defaults: SessionSettings,
    sessions: BTreeMap<SessionId, Session>,
    active: Option<SessionId>,
}

impl SessionRegistry {
    pub fn new(defaults: SessionSettings) -> Self {
        Self {
            defaults,
            sessions: BTreeMap::new(),
            active: None,
        }
    }

    /// Creates a session from the defaults, optionally overriding player
    /// count and seed, and makes it active. A failing map leaves the
    /// registry untouched.
    pub fn start(
        &mut self,
        id: SessionId,
        players: Option<usize>,
        seed: Option<u64>,
    ) -> Result<&Session, RegistryError> {
        if self.sessions.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }

        let settings = SessionSettings {
            map_file: self.defaults.map_file.clone(),
            players: players.unwrap_or(self.defaults.players),
            seed: seed.or(self.defaults.seed),
        };
        let session = Session::new(id.clone(), settings).map_err(|source| {
            warn_log!("Session {} not started: {}", id, source);
            RegistryError::Game {
                id: id.clone(),
                source,
            }
        })?;

        log!("Session started: {}", id);
        self.active = Some(id.clone());
        Ok(&*self.sessions.entry(id).or_insert(session))
    }

    pub fn switch(&mut self, id: &SessionId) -> Result<(), RegistryError> {
        if !self.sessions.contains_key(id) {
            return Err(RegistryError::NotFound(id.clone()));
        }
        log!("Switched to session: {}", id);
        self.active = Some(id.clone());
        Ok(())
    }

    /// Returns whether the deleted session was the active one.
    pub fn delete(&mut self, id: &SessionId) -> Result<bool, RegistryError> {
        if self.sessions.remove(id).is_none() {
            return Err(RegistryError::NotFound(id.clone()));
        }
        log!("Session deleted: {}", id);

        let was_active = self.active.as_ref() == Some(id);
        if was_active {
            self.active = None;
        }
        Ok(was_active)
    }

    /// Sorted by identifier.
    pub fn ids(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Session> {
        let id = self.active.as_ref()?;
        self.sessions.get_mut(id)
    }

    /// Replaces the active session's game with a fresh one built from the
    /// same map, player count and seed. The old game is kept if rebuilding
    /// fails.
    pub fn rematch(&mut self) -> Result<&Session, RegistryError> {
        let session = self.active_mut().ok_or(RegistryError::NoActiveSession)?;
        let game = session
            .settings
            .build_game()
            .map_err(|source| {
                warn_log!("Rematch failed for session {}: {}", session.id, source);
                RegistryError::Game {
                    id: session.id.clone(),
                    source,
                }
            })?;
        session.game = game;

        log!("Rematch for session: {}", session.id);
        Ok(&*session)
    }
}
