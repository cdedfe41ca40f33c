//! Short-lived tactical event log
//!
//! Combat events are stamped with the log's own clock and dropped once older
//! than the configured TTL, so a deliberation only sees what happened in the
//! last few seconds.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TacticalEventKind {
    Damaged { amount: f32 },
    Healed { amount: f32 },
    Destroyed,
    WeaponFired { target: Option<EntityHandle> },
    WeaponEmpty,
    ReloadStarted,
    ReloadCompleted,
    TargetCaptured { camp: EntityHandle },
}

/// One event as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TacticalEvent {
    pub kind: TacticalEventKind,
    pub subject: EntityHandle,
    pub position: Vec2,
    /// Whether the subject belongs to the commanded team
    pub friendly: bool,
}

impl TacticalEvent {
    pub fn new(kind: TacticalEventKind, subject: EntityHandle, position: Vec2, friendly: bool) -> Self {
        Self {
            kind,
            subject,
            position,
            friendly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub timestamp: f32,
    pub event: TacticalEvent,
}

#[derive(Debug, Clone)]
pub struct TacticalEventLog {
    ttl: f32,
    clock: f32,
    events: VecDeque<LoggedEvent>,
}

impl TacticalEventLog {
    pub fn new(ttl: f32) -> Self {
        Self {
            ttl,
            clock: 0.0,
            events: VecDeque::new(),
        }
    }

    pub fn record(&mut self, event: TacticalEvent) {
        self.events.push_back(LoggedEvent {
            timestamp: self.clock,
            event,
        });
    }

    /// Advance the clock and purge expired events from the front
    pub fn advance(&mut self, delta: f32) {
        self.clock += delta;
        while let Some(front) = self.events.front() {
            if self.clock - front.timestamp > self.ttl {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Friendly units destroyed within the TTL window
    pub fn friendly_losses(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.event.friendly && e.event.kind == TacticalEventKind::Destroyed)
            .count()
    }

    /// Total damage taken by friendly units within the TTL window
    pub fn friendly_damage(&self) -> f32 {
        self.events
            .iter()
            .filter(|e| e.event.friendly)
            .map(|e| match e.event.kind {
                TacticalEventKind::Damaged { amount } => amount,
                _ => 0.0,
            })
            .sum()
    }
}
