//! crates/figure8_core/src/store.rs
//!
//! The Map Store owns the in-memory list of maps and the current selection,
//! and mirrors every mutation to the remote document store.
//!
//! Local state is only touched while holding the state lock, and the lock is
//! never held across a remote call, so operations may interleave while a
//! remote call is pending. Local changes apply in call order; remote writes
//! may land in any order. Pin additions are commutative at the store, pin
//! deletions and map deletions are not.

use crate::color::{background_for, BackgroundColor};
use crate::document::{pins_to_document, MapRecord, PinRecord, MAPS_COLLECTION};
use crate::domain::{AuthState, Identity, MapData, Pin};
use crate::error::{StoreError, StoreResult, ValidationError};
use crate::ports::{DocumentStore, Filter, PortError};
use crate::render::{Marker, Viewport};
use crate::seed;
use crate::session::Session;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

//=========================================================================================
// State
//=========================================================================================

/// Lifecycle of the map set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// No principal known yet, nothing loaded.
    #[default]
    Unresolved,
    /// Signed out: only the local example map.
    Anonymous,
    /// Maps of `owner_id` loaded from the document store.
    Loaded { owner_id: String },
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Unresolved => "unresolved",
            Phase::Anonymous => "anonymous",
            Phase::Loaded { .. } => "loaded",
        }
    }

    fn is_loaded_for(&self, uid: &str) -> bool {
        matches!(self, Phase::Loaded { owner_id } if owner_id == uid)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStoreState {
    pub phase: Phase,
    pub maps: Vec<MapData>,
    pub selected_map_id: Option<String>,
    /// Names of maps whose remote create is still in flight.
    pub pending_names: BTreeSet<String>,
}

impl MapStoreState {
    pub fn selected_map(&self) -> Option<&MapData> {
        let id = self.selected_map_id.as_deref()?;
        self.maps.iter().find(|map| map.id == id)
    }

    fn selected_map_mut(&mut self) -> Option<&mut MapData> {
        let id = self.selected_map_id.as_deref()?;
        self.maps.iter_mut().find(|map| map.id == id)
    }
}

//=========================================================================================
// Renderable View
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalView {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub pins: Vec<PinRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedMapView {
    pub map_id: String,
    pub viewport: Viewport,
    pub markers: Vec<Marker>,
}

/// Everything the Presentation Boundary needs to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub phase: &'static str,
    pub principal: Option<PrincipalView>,
    pub maps: Vec<MapView>,
    pub selected_map_id: Option<String>,
    pub background_color: BackgroundColor,
    pub selected: Option<SelectedMapView>,
}

//=========================================================================================
// The Map Store
//=========================================================================================

pub struct MapStore {
    documents: Arc<dyn DocumentStore>,
    session: Arc<Session>,
    state: Mutex<MapStoreState>,
}

impl MapStore {
    pub fn new(documents: Arc<dyn DocumentStore>, session: Arc<Session>) -> Self {
        Self {
            documents,
            session,
            state: Mutex::new(MapStoreState::default()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Spawns the task that reloads the map set on every principal change.
    /// It runs until the identity provider goes away.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut changes = store.session.changes();
        tokio::spawn(async move {
            loop {
                let auth_state = changes.borrow_and_update().clone();
                if let Err(e) = store.apply_auth_state(auth_state).await {
                    error!("Failed to load maps after principal change: {}", e);
                }
                if changes.changed().await.is_err() {
                    debug!("Identity provider closed, stopping map sync.");
                    break;
                }
            }
        })
    }

    /// Re-derives the map set from the session's current principal.
    pub async fn refresh(&self) -> StoreResult<()> {
        self.apply_auth_state(self.session.auth_state()).await
    }

    pub async fn apply_auth_state(&self, auth_state: AuthState) -> StoreResult<()> {
        match auth_state {
            AuthState::Unresolved => {
                *self.state.lock().await = MapStoreState::default();
            }
            AuthState::SignedOut => {
                info!("No principal, showing the example map.");
                let example = seed::anonymous_example_map();
                let mut state = self.state.lock().await;
                state.phase = Phase::Anonymous;
                state.selected_map_id = Some(example.id.clone());
                state.maps = vec![example];
            }
            AuthState::SignedIn(identity) => self.load_for(identity).await?,
        }
        Ok(())
    }

    async fn load_for(&self, identity: Identity) -> StoreResult<()> {
        let uid = identity.uid;
        info!(uid = %uid, "Loading maps.");
        self.ensure_default_map(&uid).await?;
        let maps = self.fetch_maps(&uid).await?;

        // The principal may have changed while the reads were in flight.
        if self.session.principal().map(|p| p.uid).as_deref() != Some(uid.as_str()) {
            debug!(uid = %uid, "Principal changed during load, discarding result.");
            return Ok(());
        }

        let mut state = self.state.lock().await;
        state.selected_map_id = maps.first().map(|map| map.id.clone());
        state.maps = maps;
        state.phase = Phase::Loaded { owner_id: uid };
        Ok(())
    }

    /// Makes sure `owner_id` owns at least one map, creating the default
    /// "Example Map" when it owns none. The default map has a well-known id,
    /// so a retried provisioning rewrites the same document instead of adding
    /// a second one. Returns whether a map was created.
    pub async fn ensure_default_map(&self, owner_id: &str) -> StoreResult<bool> {
        let existing = self
            .documents
            .get(MAPS_COLLECTION, &Filter::eq("ownerId", owner_id))
            .await?;
        if !existing.is_empty() {
            return Ok(false);
        }

        let map = seed::default_map_for(owner_id, Utc::now());
        self.write_map(&map).await?;
        info!(owner_id, map_id = %map.id, "Provisioned default map.");
        Ok(true)
    }

    /// Reads the maps of `owner_id`, most recent first.
    pub async fn fetch_maps(&self, owner_id: &str) -> StoreResult<Vec<MapData>> {
        let documents = self
            .documents
            .get(MAPS_COLLECTION, &Filter::eq("ownerId", owner_id))
            .await?;

        let mut maps: Vec<MapData> = documents
            .into_iter()
            .filter_map(|document| match MapRecord::from_document(document) {
                Ok(record) => Some(record.to_domain()),
                Err(e) => {
                    warn!(owner_id, "Skipping unreadable map document: {}", e);
                    None
                }
            })
            .collect();
        maps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(maps)
    }

    //-------------------------------------------------------------------------------------
    // Mutations
    //-------------------------------------------------------------------------------------

    /// Creates a map for the current principal, persists it, then prepends it
    /// locally and selects it.
    ///
    /// The name is reserved until the remote write settles, so concurrent
    /// creates of the same name cannot both pass the uniqueness check.
    pub async fn add_map(&self, name: &str) -> StoreResult<MapData> {
        let identity = self.session.require_principal().await?;

        let name = name.trim();
        {
            let mut state = self.state.lock().await;
            if !state.phase.is_loaded_for(&identity.uid) {
                return Err(StoreError::NotLoaded);
            }
            if name.is_empty() {
                return Err(ValidationError::EmptyName.into());
            }
            let taken = state
                .maps
                .iter()
                .any(|map| map.owner_id == identity.uid && map.name == name);
            if taken || !state.pending_names.insert(name.to_string()) {
                return Err(ValidationError::DuplicateMapName(name.to_string()).into());
            }
        }

        let map = MapData {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id: identity.uid.clone(),
            pins: Vec::new(),
            created_at: Utc::now(),
        };
        let written = self.write_map(&map).await;

        let mut state = self.state.lock().await;
        state.pending_names.remove(&map.name);
        written?;
        if !state.phase.is_loaded_for(&identity.uid) {
            warn!(map_id = %map.id, "Principal changed while creating map, not showing it.");
            return Ok(map);
        }
        state.maps.insert(0, map.clone());
        state.selected_map_id = Some(map.id.clone());
        info!(map_id = %map.id, name = %map.name, "Map created.");
        Ok(map)
    }

    /// Appends a pin to the selected map, locally and at the store. The
    /// example map shown to anonymous users only changes locally.
    pub async fn add_pin(&self, pin: Pin) -> StoreResult<()> {
        pin.validate()?;

        let (map_id, remote) = {
            let mut state = self.state.lock().await;
            let map = state.selected_map_mut().ok_or(StoreError::NoSelection)?;
            if map.pin(&pin.id).is_some() {
                return Err(ValidationError::DuplicatePinId(pin.id).into());
            }
            map.pins.push(pin.clone());
            (map.id.clone(), !map.is_example())
        };

        if !remote {
            return Ok(());
        }
        let value = PinRecord::from_domain(&pin)
            .to_document()
            .map_err(|e| remote_write_failed(&map_id, e))?;
        self.documents
            .update_append(MAPS_COLLECTION, &map_id, "pins", value)
            .await
            .map_err(|e| remote_write_failed(&map_id, e))?;
        debug!(map_id = %map_id, pin_id = %pin.id, "Pin added.");
        Ok(())
    }

    /// Removes a pin from the selected map, then overwrites the stored pin
    /// list. Unknown ids are a no-op.
    pub async fn delete_pin(&self, pin_id: &str) -> StoreResult<()> {
        self.session.require_principal().await?;

        let (map_id, pins) = {
            let mut state = self.state.lock().await;
            let map = state.selected_map_mut().ok_or(StoreError::NoSelection)?;
            let before = map.pins.len();
            map.pins.retain(|pin| pin.id != pin_id);
            if map.pins.len() == before || map.is_example() {
                return Ok(());
            }
            (map.id.clone(), map.pins.clone())
        };

        let value = pins_to_document(&pins).map_err(|e| remote_write_failed(&map_id, e))?;
        self.documents
            .update_field(MAPS_COLLECTION, &map_id, "pins", value)
            .await
            .map_err(|e| remote_write_failed(&map_id, e))?;
        debug!(map_id = %map_id, pin_id, "Pin deleted.");
        Ok(())
    }

    /// Removes a map locally, drops the selection, then deletes the stored
    /// document. Choosing the next selection is up to the caller.
    pub async fn delete_map(&self, map_id: &str) -> StoreResult<()> {
        let identity = self.session.require_principal().await?;

        let owned = {
            let mut state = self.state.lock().await;
            let Some(index) = state.maps.iter().position(|map| map.id == map_id) else {
                return Ok(());
            };
            let removed = state.maps.remove(index);
            state.selected_map_id = None;
            removed.owner_id == identity.uid
        };

        if !owned {
            return Ok(());
        }
        self.documents
            .delete(MAPS_COLLECTION, map_id)
            .await
            .map_err(|e| remote_write_failed(map_id, e))?;
        info!(map_id, "Map deleted.");
        Ok(())
    }

    /// Local only. Callers must pass an id taken from the current map list.
    pub async fn select_map(&self, map_id: &str) {
        self.state.lock().await.selected_map_id = Some(map_id.to_string());
    }

    /// Signs out and clears the map set. The example map comes back once the
    /// signed-out state has been applied.
    pub async fn sign_out(&self) -> StoreResult<()> {
        self.session.sign_out().await?;
        *self.state.lock().await = MapStoreState::default();
        self.refresh().await
    }

    //-------------------------------------------------------------------------------------
    // Reads
    //-------------------------------------------------------------------------------------

    pub async fn snapshot(&self) -> MapStoreState {
        self.state.lock().await.clone()
    }

    pub async fn background_color(&self) -> BackgroundColor {
        let state = self.state.lock().await;
        background_for(state.selected_map().map(|map| map.id.as_str()))
    }

    pub async fn view(&self) -> ViewState {
        let principal = self.session.principal().map(|identity| PrincipalView {
            uid: identity.uid,
            email: identity.email,
        });
        let state = self.state.lock().await;

        let maps = state
            .maps
            .iter()
            .map(|map| MapView {
                id: map.id.clone(),
                name: map.name.clone(),
                owner_id: map.owner_id.clone(),
                pins: map.pins.iter().map(PinRecord::from_domain).collect(),
            })
            .collect();
        let selected_map = state.selected_map();
        let selected = selected_map.map(|map| SelectedMapView {
            map_id: map.id.clone(),
            viewport: Viewport::for_pins(&map.pins),
            markers: map.pins.iter().map(Marker::for_pin).collect(),
        });

        ViewState {
            phase: state.phase.as_str(),
            principal,
            maps,
            selected_map_id: state.selected_map_id.clone(),
            background_color: background_for(selected_map.map(|map| map.id.as_str())),
            selected,
        }
    }

    async fn write_map(&self, map: &MapData) -> StoreResult<()> {
        let document = MapRecord::from_domain(map)
            .to_document()
            .map_err(|e| remote_write_failed(&map.id, e))?;
        self.documents
            .set(MAPS_COLLECTION, &map.id, document)
            .await
            .map_err(|e| remote_write_failed(&map.id, e))
    }
}

/// Logs a failed write. Local state is not rolled back.
fn remote_write_failed(map_id: &str, source: PortError) -> StoreError {
    error!(collection = MAPS_COLLECTION, map_id, "Remote write failed: {}", source);
    StoreError::RemoteWrite {
        collection: MAPS_COLLECTION,
        id: map_id.to_string(),
        source,
    }
}
