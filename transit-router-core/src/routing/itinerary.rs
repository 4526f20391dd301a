use serde::{Deserialize, Serialize};

use crate::Minutes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Wait,
    Bus,
}

/// Itinerary leg attached to a graph edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    /// Stop name for a wait, bus name for a ride
    pub name: String,
    pub time: Minutes,
    /// Stops passed by the ride, 1 for a wait
    pub span_count: usize,
}

/// A single leg of an answered route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RouteItem {
    /// Waiting for a bus at a stop
    Wait { stop_name: String, time: Minutes },
    /// Riding a bus for `span_count` stops
    Bus {
        bus: String,
        span_count: usize,
        time: Minutes,
    },
}

impl RouteItem {
    pub fn time(&self) -> Minutes {
        match self {
            RouteItem::Wait { time, .. } | RouteItem::Bus { time, .. } => *time,
        }
    }
}

impl From<&Item> for RouteItem {
    fn from(item: &Item) -> Self {
        match item.kind {
            ItemKind::Wait => RouteItem::Wait {
                stop_name: item.name.clone(),
                time: item.time,
            },
            ItemKind::Bus => RouteItem::Bus {
                bus: item.name.clone(),
                span_count: item.span_count,
                time: item.time,
            },
        }
    }
}

/// Fastest itinerary between two stops
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub total_time: Minutes,
    pub items: Vec<RouteItem>,
}
