//! Integration tests for the maze generator.

use std::collections::{HashSet, VecDeque};

use crownhunt_mapgen::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Map, Tile, new_map, new_map_seeded};

/// Flood-fills from (1, 1) and returns every reachable floor tile.
fn reachable(map: &Map) -> HashSet<(u32, u32)> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([(1u32, 1u32)]);
    seen.insert((1, 1));

    while let Some((x, z)) = queue.pop_front() {
        let neighbours = [
            (x.wrapping_sub(1), z),
            (x + 1, z),
            (x, z.wrapping_sub(1)),
            (x, z + 1),
        ];
        for (nx, nz) in neighbours {
            if map.is_floor(nx, nz) && seen.insert((nx, nz)) {
                queue.push_back((nx, nz));
            }
        }
    }
    seen
}

#[test]
fn test_default_map_has_solid_border() {
    let map = new_map(DEFAULT_WIDTH, DEFAULT_HEIGHT).unwrap();
    assert_eq!(map.tiles.len(), (DEFAULT_WIDTH * DEFAULT_HEIGHT) as usize);

    for x in 0..map.width {
        assert_eq!(map.tile(x, 0), Some(Tile::Wall));
        assert_eq!(map.tile(x, map.height - 1), Some(Tile::Wall));
    }
    for z in 0..map.height {
        assert_eq!(map.tile(0, z), Some(Tile::Wall));
        assert_eq!(map.tile(map.width - 1, z), Some(Tile::Wall));
    }
}

#[test]
fn test_every_room_cell_is_reachable() {
    let map = new_map_seeded(31, 21, 1234).unwrap();
    let seen = reachable(&map);

    for z in (1..map.height).step_by(2) {
        for x in (1..map.width).step_by(2) {
            assert!(seen.contains(&(x, z)), "room ({x},{z}) unreachable");
        }
    }
    // Everything that is floor is reachable: no isolated pockets.
    assert_eq!(seen.len(), map.floor_count());
}

#[test]
fn test_perfect_maze_floor_count() {
    // A spanning tree over R room cells carves R - 1 connecting walls.
    let map = new_map_seeded(21, 21, 99).unwrap();
    let rooms = (21 / 2) * (21 / 2);
    assert_eq!(map.floor_count(), rooms + rooms - 1);
}

#[test]
fn test_map_json_shape() {
    let map = new_map_seeded(5, 5, 0).unwrap();
    let json: serde_json::Value = serde_json::to_value(&map).unwrap();
    assert_eq!(json["width"], 5);
    assert_eq!(json["height"], 5);
    assert_eq!(json["tiles"].as_array().unwrap().len(), 25);
    assert_eq!(json["tiles"][0], "wall");
}
