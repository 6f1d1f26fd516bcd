//! Typed access to the King's Valley game service.
//!
//! [`GameApi`] is the seam the session core talks through. [`HttpGameApi`]
//! is the production implementation over `reqwest`; every transport or HTTP
//! failure comes back as an [`ApiError`] of one of four kinds, and nothing
//! here retries.

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorKind};
use crate::wire::{
    CreateGameBody, ErrorDetailDto, GameDto, GameResponseDto, HealthDto, JoinGameBody, MoveBody,
    MoveResponseDto,
};
use async_trait::async_trait;
use derive_getters::Getters;
use derive_new::new;
use kings_valley::{Cell, GameId, GameSnapshot, PlayerId, PlayerInfo, PlayerName, PlayerNumber, RoomCode};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

/// A seat obtained by creating or joining a room.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct Joined {
    /// The local player.
    player: PlayerInfo,
    /// Room state at the moment of joining.
    snapshot: GameSnapshot,
}

/// A move attempt.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct MoveRequest {
    /// Target game.
    game_id: GameId,
    /// Moving player.
    player_id: PlayerId,
    /// Origin cell.
    from: Cell,
    /// Destination cell.
    to: Cell,
}

/// A move the service accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct MoveAccepted {
    /// Winner, if this move ended the game.
    pub winner: Option<PlayerNumber>,
}

/// Operations offered by the game service.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Opens a new room with the caller as player 1.
    async fn create_game(&self, name: &PlayerName) -> Result<Joined, ApiError>;

    /// Takes the free seat of an existing room.
    async fn join_game(&self, room: &RoomCode, name: &PlayerName) -> Result<Joined, ApiError>;

    /// Fetches the current state of a game.
    async fn fetch_game(&self, id: &GameId) -> Result<GameSnapshot, ApiError>;

    /// Looks a game up by its room code.
    async fn fetch_game_by_room(&self, room: &RoomCode) -> Result<GameSnapshot, ApiError>;

    /// Submits a move.
    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveAccepted, ApiError>;

    /// Checks that the service is reachable, returning its greeting.
    async fn ping(&self) -> Result<String, ApiError>;
}

/// [`GameApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGameApi {
    /// REST root, e.g. `http://localhost:8000/api`.
    base_url: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl HttpGameApi {
    /// Creates a client for the service described by `config`.
    #[instrument(skip(config), fields(api_url = %config.api_url()))]
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        info!("Game API client ready");
        Ok(Self {
            base_url: config.api_root(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps the response status to a typed error, then decodes the body.
    ///
    /// `bad_request` is the meaning of a 400 for this endpoint; endpoints
    /// without one treat it as a network error.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        bad_request: Option<ApiErrorKind>,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorDetailDto>(&body)
                .map(|d| d.detail)
                .unwrap_or_else(|_| body.clone());
            let kind = match (status, bad_request) {
                (StatusCode::NOT_FOUND, _) => ApiErrorKind::NotFound,
                (StatusCode::BAD_REQUEST, Some(kind)) => kind,
                _ => ApiErrorKind::Network,
            };
            warn!(status = %status, %kind, detail = %detail, "Game service rejected request");
            return Err(ApiError::new(kind, format!("HTTP {}: {}", status, detail)));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %body, "Failed to decode response");
            ApiError::network(format!("Invalid JSON response: {}", e))
        })
    }

    fn joined(response: GameResponseDto, name: &PlayerName) -> Result<Joined, ApiError> {
        let (player, snapshot) = response.into_joined(name)?;
        Ok(Joined::new(player, snapshot))
    }

    fn snapshot(game: GameDto) -> Result<GameSnapshot, ApiError> {
        game.into_snapshot().map_err(|e| {
            warn!(error = %e, "Service returned an inconsistent game");
            ApiError::network(format!("Inconsistent game payload: {}", e))
        })
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    #[instrument(skip_all, fields(name = %name))]
    async fn create_game(&self, name: &PlayerName) -> Result<Joined, ApiError> {
        info!("Creating game");
        let response = self
            .client
            .post(self.url("/game/create"))
            .json(&CreateGameBody {
                player_name: name.as_str(),
            })
            .send()
            .await?;

        let joined = Self::joined(Self::decode(response, None).await?, name)?;
        info!(
            game_id = %joined.snapshot().id(),
            room_code = %joined.snapshot().room_code(),
            "Game created"
        );
        Ok(joined)
    }

    #[instrument(skip_all, fields(room = %room, name = %name))]
    async fn join_game(&self, room: &RoomCode, name: &PlayerName) -> Result<Joined, ApiError> {
        info!("Joining game");
        let response = self
            .client
            .post(self.url("/game/join"))
            .json(&JoinGameBody {
                room_code: room.as_str(),
                player_name: name.as_str(),
            })
            .send()
            .await?;

        let joined = Self::joined(
            Self::decode(response, Some(ApiErrorKind::RoomFull)).await?,
            name,
        )?;
        info!(
            game_id = %joined.snapshot().id(),
            number = %joined.player().number(),
            "Joined game"
        );
        Ok(joined)
    }

    #[instrument(skip_all, fields(game_id = %id))]
    async fn fetch_game(&self, id: &GameId) -> Result<GameSnapshot, ApiError> {
        debug!("Fetching game");
        let response = self
            .client
            .get(self.url(&format!("/game/{}", id.as_str())))
            .send()
            .await?;
        Self::snapshot(Self::decode(response, None).await?)
    }

    #[instrument(skip_all, fields(room = %room))]
    async fn fetch_game_by_room(&self, room: &RoomCode) -> Result<GameSnapshot, ApiError> {
        debug!("Fetching game by room code");
        let response = self
            .client
            .get(self.url(&format!("/game/room/{}", room.as_str())))
            .send()
            .await?;
        Self::snapshot(Self::decode(response, None).await?)
    }

    #[instrument(skip_all, fields(game_id = %request.game_id(), from = %request.from(), to = %request.to()))]
    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveAccepted, ApiError> {
        info!("Submitting move");
        let response = self
            .client
            .post(self.url("/game/move"))
            .json(&MoveBody {
                game_id: request.game_id().as_str(),
                player_id: request.player_id().as_str(),
                from_row: request.from().row(),
                from_col: request.from().col(),
                to_row: request.to().row(),
                to_col: request.to().col(),
            })
            .send()
            .await?;

        let outcome: MoveResponseDto =
            Self::decode(response, Some(ApiErrorKind::InvalidMove)).await?;
        if !outcome.success {
            warn!("Service reported an unsuccessful move");
            return Err(ApiError::new(
                ApiErrorKind::InvalidMove,
                "Move was not applied",
            ));
        }

        info!(winner = ?outcome.winner, "Move accepted");
        Ok(MoveAccepted::new(outcome.winner))
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<String, ApiError> {
        let response = self.client.get(self.url("/")).send().await?;
        let health: HealthDto = Self::decode(response, None).await?;
        debug!(message = %health.message, "Service reachable");
        Ok(health.message)
    }
}
