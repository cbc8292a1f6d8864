//! The proximity elimination rule.

use crownhunt_protocol::PlayerView;

use crate::registry::Registry;

/// Marks every living non-monster player strictly within `radius` of the
/// monster on the X/Z plane as dead, and returns them ordered by id.
///
/// Does nothing when no monster is assigned. Each player is judged only on
/// its own distance to the monster, so the result does not depend on the
/// order players are visited in.
pub(crate) fn eliminate(registry: &mut Registry, radius: f64) -> Vec<PlayerView> {
    let Some(monster) = registry.monster() else {
        return Vec::new();
    };
    let monster_id = monster.id();
    let origin = monster.position();

    let mut victims: Vec<PlayerView> = registry
        .players_mut()
        .filter(|p| p.id() != monster_id && !p.is_dead())
        .filter(|p| origin.planar_distance(&p.position()) < radius)
        .map(|p| {
            p.kill();
            p.view()
        })
        .collect();

    victims.sort_by_key(|v| v.id);
    victims
}

#[cfg(test)]
mod tests {
    use crownhunt_protocol::{PlayerId, Position};

    use super::*;
    use crate::PlayerHandle;

    /// Admits players in order and gives each a role (first is the monster),
    /// then places them.
    fn arena(positions: &[(f64, f64)]) -> Registry {
        let mut registry = Registry::new();
        for (i, (x, z)) in positions.iter().enumerate() {
            let id = PlayerId(i as u64 + 1);
            let (mut player, _rx) = PlayerHandle::channel(id, 4);
            player.set_position(Position::new(*x, 0.0, *z));
            registry.admit(player).unwrap();
            registry.assign_role(id);
        }
        registry
    }

    fn ids(views: &[PlayerView]) -> Vec<u64> {
        views.iter().map(|v| v.id.0).collect()
    }

    #[test]
    fn test_close_servant_dies() {
        let mut registry = arena(&[(0.0, 0.0), (20.0, 20.0), (0.5, 0.5)]);
        let victims = eliminate(&mut registry, 1.0);
        assert_eq!(ids(&victims), vec![3]);
        assert!(victims[0].dead);
        assert!(registry.get(PlayerId(3)).unwrap().is_dead());
    }

    #[test]
    fn test_far_servant_survives() {
        let mut registry = arena(&[(0.0, 0.0), (20.0, 20.0), (10.0, 10.0)]);
        assert!(eliminate(&mut registry, 1.0).is_empty());
        assert!(!registry.get(PlayerId(3)).unwrap().is_dead());
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut registry = arena(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.999)]);
        let victims = eliminate(&mut registry, 1.0);
        // Exactly 1.0 away survives; 0.999 does not.
        assert_eq!(ids(&victims), vec![3]);
    }

    #[test]
    fn test_height_is_ignored() {
        let mut registry = arena(&[(0.0, 0.0), (20.0, 20.0), (0.2, 0.2)]);
        registry
            .get_mut(PlayerId(3))
            .unwrap()
            .set_position(Position::new(0.2, 50.0, 0.2));
        assert_eq!(ids(&eliminate(&mut registry, 1.0)), vec![3]);
    }

    #[test]
    fn test_several_victims_in_one_pass() {
        let mut registry = arena(&[(5.0, 5.0), (5.1, 5.0), (4.9, 5.2), (9.0, 9.0)]);
        assert_eq!(ids(&eliminate(&mut registry, 1.0)), vec![2, 3]);
    }

    #[test]
    fn test_dead_players_are_not_reported_twice() {
        let mut registry = arena(&[(0.0, 0.0), (0.5, 0.0)]);
        assert_eq!(ids(&eliminate(&mut registry, 1.0)), vec![2]);
        assert!(eliminate(&mut registry, 1.0).is_empty());
        assert!(registry.get(PlayerId(2)).unwrap().is_dead());
    }

    #[test]
    fn test_no_monster_no_eliminations() {
        let mut registry = Registry::new();
        let (mut player, _rx) = PlayerHandle::channel(PlayerId(1), 4);
        player.set_position(Position::default());
        registry.admit(player).unwrap();
        // Unassigned players sitting on the origin: nobody to hunt them.
        assert!(eliminate(&mut registry, 1.0).is_empty());
    }

    #[test]
    fn test_unassigned_players_can_be_eliminated() {
        let mut registry = arena(&[(0.0, 0.0)]);
        let (mut player, _rx) = PlayerHandle::channel(PlayerId(9), 4);
        player.set_position(Position::new(0.3, 0.0, 0.0));
        registry.admit(player).unwrap();
        assert_eq!(ids(&eliminate(&mut registry, 1.0)), vec![9]);
    }
}
