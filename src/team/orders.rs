//! Orders issued by the commander to its units
//!
//! The commander never drives locomotion itself. Each tick it returns a list
//! of orders and the host applies them to the unit controllers.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, Vec2};

/// Types of orders that can be sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderType {
    MoveTo(Vec2),
    Attack(EntityHandle),
    Stop,
    /// Turn in place by the given angle (radians)
    Rotate(f32),
}

/// An order for a single unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub unit: EntityHandle,
    pub order_type: OrderType,
}

impl Order {
    pub fn new(unit: EntityHandle, order_type: OrderType) -> Self {
        Self { unit, order_type }
    }

    /// Convenience: create a move order
    pub fn move_to(unit: EntityHandle, destination: Vec2) -> Self {
        Self::new(unit, OrderType::MoveTo(destination))
    }

    /// Convenience: create an attack order
    pub fn attack(unit: EntityHandle, target: EntityHandle) -> Self {
        Self::new(unit, OrderType::Attack(target))
    }

    /// Convenience: create a stop order
    pub fn stop(unit: EntityHandle) -> Self {
        Self::new(unit, OrderType::Stop)
    }

    /// Convenience: create a rotate order
    pub fn rotate(unit: EntityHandle, angle: f32) -> Self {
        Self::new(unit, OrderType::Rotate(angle))
    }

    pub fn is_move(&self) -> bool {
        matches!(self.order_type, OrderType::MoveTo(_))
    }

    pub fn is_attack(&self) -> bool {
        matches!(self.order_type, OrderType::Attack(_))
    }
}
