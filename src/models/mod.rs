pub mod chats;
pub mod foster_assignments;
pub mod helper_profiles;
pub mod pet_relationships;
pub mod pet_types;
pub mod pets;
pub mod placement_request_responses;
pub mod placement_requests;
pub mod transfer_requests;
pub mod users;
