//! Pure order-planning rules behind relocate operations.
//!
//! Kept free of SQL so the position arithmetic can be checked directly.

use uuid::Uuid;

/// Clamps a caller-supplied position into `[0, len]`.
pub fn clamp_position(position: i64, len: usize) -> usize {
    if position <= 0 {
        0
    } else {
        usize::try_from(position).map_or(len, |value| value.min(len))
    }
}

/// Dense `0..=others.len()` assignment with `moving` inserted at `position`.
///
/// `others` are the positional participants in current order, excluding the
/// moving entity.
pub fn dense_insertion(others: &[Uuid], moving: Uuid, position: i64) -> Vec<(Uuid, i64)> {
    let index = clamp_position(position, others.len());
    let mut ordered = Vec::with_capacity(others.len() + 1);
    ordered.extend_from_slice(&others[..index]);
    ordered.push(moving);
    ordered.extend_from_slice(&others[index..]);

    ordered
        .into_iter()
        .enumerate()
        .map(|(order, id)| (id, order as i64))
        .collect()
}

/// Target `sort_order` for an entity entering a new container at `position`.
///
/// `participant_orders` are the destination's positional participants in
/// ascending order; `max_any` is the destination's maximum over all siblings.
pub fn cross_container_target(
    participant_orders: &[i64],
    max_any: Option<i64>,
    position: i64,
) -> i64 {
    match (participant_orders.first(), participant_orders.last()) {
        (Some(&first), Some(&last)) => {
            if position <= 0 {
                first
            } else if position >= participant_orders.len() as i64 {
                last + 1
            } else {
                participant_orders[position as usize]
            }
        }
        _ => max_any.map_or(0, |max| max + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_position, cross_container_target, dense_insertion};
    use uuid::Uuid;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn clamp_handles_negative_and_overflow() {
        assert_eq!(clamp_position(-3, 4), 0);
        assert_eq!(clamp_position(2, 4), 2);
        assert_eq!(clamp_position(9, 4), 4);
        assert_eq!(clamp_position(i64::MAX, 4), 4);
    }

    #[test]
    fn dense_insertion_places_moving_in_the_middle() {
        let others = ids(3);
        let moving = Uuid::new_v4();
        let plan = dense_insertion(&others, moving, 1);
        assert_eq!(
            plan,
            vec![(others[0], 0), (moving, 1), (others[1], 2), (others[2], 3)]
        );
    }

    #[test]
    fn dense_insertion_clamps_to_the_end() {
        let others = ids(2);
        let moving = Uuid::new_v4();
        let plan = dense_insertion(&others, moving, 50);
        assert_eq!(plan.last(), Some(&(moving, 2)));
        assert_eq!(dense_insertion(&[], moving, 3), vec![(moving, 0)]);
    }

    #[test]
    fn cross_target_follows_position_rules() {
        let orders = [0, 1, 2];
        assert_eq!(cross_container_target(&orders, Some(2), -1), 0);
        assert_eq!(cross_container_target(&orders, Some(2), 0), 0);
        assert_eq!(cross_container_target(&orders, Some(2), 1), 1);
        assert_eq!(cross_container_target(&orders, Some(2), 3), 3);
        assert_eq!(cross_container_target(&orders, Some(2), 10), 3);
    }

    #[test]
    fn cross_target_uses_gapped_values() {
        let orders = [4, 9, 15];
        assert_eq!(cross_container_target(&orders, Some(20), 2), 15);
        assert_eq!(cross_container_target(&orders, Some(20), 3), 16);
    }

    #[test]
    fn cross_target_without_participants_appends() {
        assert_eq!(cross_container_target(&[], Some(6), 0), 7);
        assert_eq!(cross_container_target(&[], None, 2), 0);
    }
}
