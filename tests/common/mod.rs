//! Shared fixtures: an in-memory SQLite database migrated with the real
//! migrations, a notifier that records intents, and seed helpers.

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use placement_backend::auth::authorization::Actor;
use placement_backend::db::relationships as relationship_db;
use placement_backend::models::pet_relationships::RelationshipType;
use placement_backend::models::placement_request_responses::{self, RespondToPlacementRequest};
use placement_backend::models::placement_requests::{self, CreatePlacementRequest, RequestType};
use placement_backend::models::{chats, helper_profiles, pet_types, pets, users};
use placement_backend::services::{placement_requests as request_service, responses as response_service};
use placement_backend::notifications::{EventType, NotificationIntent, Notifier};

/// Open a fresh in-memory database and run every migration on it.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Notifier that keeps every intent for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    intents: Mutex<Vec<NotificationIntent>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<NotificationIntent> {
        self.intents.lock().unwrap().clone()
    }

    pub fn sent_to(&self, user_id: Uuid, event_type: EventType) -> usize {
        self.intents
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id && i.event_type == event_type)
            .count()
    }

    pub fn clear(&self) {
        self.intents.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, intent: NotificationIntent) {
        self.intents.lock().unwrap().push(intent);
    }
}

pub async fn create_user(db: &DatabaseConnection, role: users::Roles) -> users::Model {
    let id = Uuid::new_v4();
    users::ActiveModel {
        id: Set(id),
        email: Set(format!("{id}@example.com")),
        display_name: Set(None),
        role: Set(role),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn create_pet_type(
    db: &DatabaseConnection,
    slug: &str,
    placement_requests_allowed: bool,
) -> pet_types::Model {
    pet_types::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(slug.to_string()),
        slug: Set(slug.to_string()),
        placement_requests_allowed: Set(placement_requests_allowed),
    }
    .insert(db)
    .await
    .expect("Failed to insert pet type")
}

/// Insert a pet and give it an open owner edge for `owner_id`.
pub async fn create_pet(
    db: &DatabaseConnection,
    owner_id: Uuid,
    pet_type: &pet_types::Model,
) -> pets::Model {
    let pet = pets::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Miso".to_string()),
        pet_type_id: Set(pet_type.id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert pet");

    relationship_db::insert_edge(db, pet.id, owner_id, RelationshipType::Owner, Utc::now())
        .await
        .expect("Failed to insert owner edge");

    pet
}

pub async fn create_helper_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> helper_profiles::Model {
    helper_profiles::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        city: Set(Some("Hanoi".to_string())),
        bio: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert helper profile")
}

pub fn request_input(pet_id: Uuid, request_type: RequestType) -> CreatePlacementRequest {
    CreatePlacementRequest {
        pet_id,
        request_type,
        notes: Some("Needs a quiet home".to_string()),
        expires_at: None,
        start_date: None,
        end_date: None,
    }
}

pub fn respond_input(profile: &helper_profiles::Model) -> RespondToPlacementRequest {
    RespondToPlacementRequest {
        helper_profile_id: profile.id,
        message: Some("I have a garden".to_string()),
    }
}

pub async fn create_chat(
    db: &DatabaseConnection,
    placement_request_id: Uuid,
    owner_user_id: Uuid,
    helper_user_id: Uuid,
) -> chats::Model {
    chats::ActiveModel {
        id: Set(Uuid::new_v4()),
        placement_request_id: Set(placement_request_id),
        owner_user_id: Set(owner_user_id),
        helper_user_id: Set(helper_user_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert chat")
}

/// A helper user with one helper profile.
pub struct Helper {
    pub user: users::Model,
    pub profile: helper_profiles::Model,
}

impl Helper {
    pub fn actor(&self) -> Actor {
        Actor::user(self.user.id)
    }
}

/// An owner with one cat, plus a database and a recording notifier.
pub struct World {
    pub db: DatabaseConnection,
    pub notifier: RecordingNotifier,
    pub owner: users::Model,
    pub admin: users::Model,
    pub cat_type: pet_types::Model,
    pub pet: pets::Model,
}

impl World {
    pub async fn new() -> Self {
        let db = setup_db().await;
        let owner = create_user(&db, users::Roles::User).await;
        let admin = create_user(&db, users::Roles::Admin).await;
        let cat_type = create_pet_type(&db, "cat", true).await;
        let pet = create_pet(&db, owner.id, &cat_type).await;

        Self {
            db,
            notifier: RecordingNotifier::default(),
            owner,
            admin,
            cat_type,
            pet,
        }
    }

    pub fn owner_actor(&self) -> Actor {
        Actor::user(self.owner.id)
    }

    pub fn admin_actor(&self) -> Actor {
        Actor::admin(self.admin.id)
    }

    pub async fn helper(&self) -> Helper {
        let user = create_user(&self.db, users::Roles::User).await;
        let profile = create_helper_profile(&self.db, user.id).await;
        Helper { user, profile }
    }
}

impl World {
    /// Open a request of `request_type` for the world's pet as its owner.
    pub async fn open_request(&self, request_type: RequestType) -> placement_requests::Model {
        request_service::create(&self.db, &self.owner_actor(), request_input(self.pet.id, request_type))
            .await
            .expect("Failed to create placement request")
    }

    pub async fn respond(
        &self,
        helper: &Helper,
        request_id: Uuid,
    ) -> placement_request_responses::Model {
        response_service::respond(
            &self.db,
            &self.notifier,
            &helper.actor(),
            request_id,
            respond_input(&helper.profile),
        )
        .await
        .expect("Failed to respond")
    }

    pub async fn accept(&self, response_id: Uuid) -> response_service::AcceptedResponse {
        response_service::accept(&self.db, &self.notifier, &self.owner_actor(), response_id)
            .await
            .expect("Failed to accept response")
    }
}
