use crate::models::pet_types;

/// Features a pet type can switch on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Placement,
}

/// Whether pets of this type support the given capability.
pub fn supports(pet_type: &pet_types::Model, capability: Capability) -> bool {
    match capability {
        Capability::Placement => pet_type.placement_requests_allowed,
    }
}
