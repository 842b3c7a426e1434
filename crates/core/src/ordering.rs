//! Sibling reordering shared by key results and goals.

use serde::{Deserialize, Serialize};

/// Direction of a move-up / move-down request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards the start of the list.
    Up,
    /// Towards the end of the list.
    Down,
}

impl MoveDirection {
    /// Parses a direction, accepting the `-1`/`1` form as well.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "-1" => Some(Self::Up),
            "down" | "1" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Swaps the order index of `items[position]` with its neighbour in
/// `direction`, where `items` is already sorted by order index.
///
/// Returns the positions whose order index changed, or `None` at either
/// boundary, which callers treat as a successful no-op.
pub fn swap_with_neighbor<T>(
    items: &mut [T],
    position: usize,
    direction: MoveDirection,
    order_index: impl Fn(&mut T) -> &mut u32,
) -> Option<(usize, usize)> {
    let neighbor = match direction {
        MoveDirection::Up => position.checked_sub(1)?,
        MoveDirection::Down => Some(position + 1).filter(|n| *n < items.len())?,
    };

    let (a, b) = if position < neighbor {
        (position, neighbor)
    } else {
        (neighbor, position)
    };
    let (head, tail) = items.split_at_mut(b);
    std::mem::swap(order_index(&mut head[a]), order_index(&mut tail[0]));
    Some((position, neighbor))
}

/// Next free order index after the largest one in use.
pub fn next_order_index(existing: impl IntoIterator<Item = u32>) -> u32 {
    existing.into_iter().max().map_or(0, |max| max + 1)
}
