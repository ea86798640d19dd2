//! Spatial query tests (through the cache surface)

#[cfg(test)]
mod tests {
    use creature_cache::{
        CacheConfig, Classification, Creature, CreatureCache, EntityHandle, ManualClock, Position,
        SharedCreature,
    };
    use std::sync::Arc;

    const ORIGIN: Position = Position {
        x: 1000,
        y: 1000,
        z: 7,
    };

    fn make_cache() -> CreatureCache {
        CreatureCache::with_clock(CacheConfig::default(), Arc::new(ManualClock::new(0)))
    }

    fn at(id: u32, class: Classification, dx: i32, dy: i32, z: u8) -> SharedCreature {
        Creature::new(
            id,
            format!("c{id}"),
            class,
            Position::new(ORIGIN.x + dx, ORIGIN.y + dy, z),
        )
        .shared()
    }

    fn load(cache: &mut CreatureCache, creatures: &[SharedCreature]) {
        for c in creatures {
            cache.upsert(&EntityHandle::new(c)).unwrap();
        }
    }

    // -----------------------------------------------------------------------
    // nearest
    // -----------------------------------------------------------------------

    #[test]
    fn nearest_respects_max_range() {
        let mut cache = make_cache();
        let creatures = vec![
            at(1, Classification::Hostile, 5, -1, 7),
            at(2, Classification::Hostile, 2, 2, 7),
        ];
        load(&mut cache, &creatures);

        let (entry, distance) = cache.nearest(&ORIGIN, 3).unwrap();
        assert_eq!(entry.id, 2);
        assert_eq!(distance, 2);

        assert!(cache.nearest(&ORIGIN, 1).is_none());
    }

    #[test]
    fn nearest_ignores_other_classifications() {
        let mut cache = make_cache();
        let creatures = vec![
            at(1, Classification::Player, 1, 0, 7),
            at(2, Classification::PassiveNpc, 0, 1, 7),
            at(3, Classification::Hostile, 4, 4, 7),
        ];
        load(&mut cache, &creatures);

        assert_eq!(cache.nearest(&ORIGIN, 10).map(|(e, _)| e.id), Some(3));
        assert_eq!(
            cache
                .nearest_in(Classification::Player, &ORIGIN, 10)
                .map(|(e, _)| e.id),
            Some(1)
        );
    }

    #[test]
    fn nearest_skips_invalidated_creatures() {
        let mut cache = make_cache();
        let creatures = vec![
            at(1, Classification::Hostile, 1, 1, 7),
            at(2, Classification::Hostile, 3, 0, 7),
        ];
        load(&mut cache, &creatures);
        creatures[0].write().dead = true;

        assert_eq!(cache.nearest(&ORIGIN, 5).map(|(e, d)| (e.id, d)), Some((2, 3)));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(1));
    }

    #[test]
    fn every_query_drops_dead_creatures() {
        let mut cache = make_cache();
        let rat = at(1, Classification::Hostile, 0, 1, 7);

        load(&mut cache, std::slice::from_ref(&rat));
        rat.write().dead = true;
        assert!(cache.nearest(&ORIGIN, 5).is_none());
        assert!(cache.is_empty());

        rat.write().dead = false;
        load(&mut cache, std::slice::from_ref(&rat));
        rat.write().dead = true;
        assert!(cache.on_floor(7).is_empty());
        assert!(cache.is_empty());

        rat.write().dead = false;
        load(&mut cache, std::slice::from_ref(&rat));
        rat.write().dead = true;
        assert!(cache.in_range(&ORIGIN, 5).is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn nearest_sees_new_arrivals_immediately() {
        let mut cache = make_cache();
        let far = vec![at(1, Classification::Hostile, 6, 0, 7)];
        load(&mut cache, &far);
        assert_eq!(cache.nearest(&ORIGIN, 8).unwrap().0.id, 1);

        let close = vec![at(2, Classification::Hostile, 1, 0, 7)];
        load(&mut cache, &close);
        assert_eq!(cache.nearest(&ORIGIN, 8).unwrap().0.id, 2);
    }

    // -----------------------------------------------------------------------
    // in_range / on_floor
    // -----------------------------------------------------------------------

    #[test]
    fn in_range_is_inclusive() {
        let mut cache = make_cache();
        let creatures = vec![
            at(1, Classification::Hostile, 3, -3, 7),
            at(2, Classification::Hostile, 4, 0, 7),
            at(3, Classification::Hostile, 0, 0, 7),
        ];
        load(&mut cache, &creatures);

        let mut ids: Vec<u32> = cache.in_range(&ORIGIN, 3).iter().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn on_floor_selects_level() {
        let mut cache = make_cache();
        let creatures = vec![
            at(1, Classification::Hostile, 0, 0, 7),
            at(2, Classification::Hostile, 0, 0, 8),
            at(3, Classification::Player, 0, 0, 8),
        ];
        load(&mut cache, &creatures);

        let hostile: Vec<u32> = cache.on_floor(8).iter().map(|e| e.id).collect();
        assert_eq!(hostile, vec![2]);
        let players: Vec<u32> = cache
            .on_floor_in(Classification::Player, 8)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(players, vec![3]);
    }

    #[test]
    fn unplaced_creatures_never_match() {
        let mut cache = make_cache();
        let ghost = at(1, Classification::Hostile, 0, 0, 7);
        ghost.write().position = None;
        load(&mut cache, std::slice::from_ref(&ghost));

        assert_eq!(cache.bucket(Classification::Hostile).len(), 1);
        assert!(cache.nearest(&ORIGIN, u32::MAX).is_none());
        assert!(cache.in_range(&ORIGIN, u32::MAX).is_empty());
        assert!(cache.on_floor(7).is_empty());
    }

    #[test]
    fn queries_rebuild_a_dirty_index() {
        let mut cache = make_cache();
        let creatures = vec![at(1, Classification::Hostile, 1, 0, 7)];
        load(&mut cache, &creatures);
        assert!(cache.is_index_dirty());

        cache.in_range(&ORIGIN, 5);
        assert!(!cache.is_index_dirty());
        assert_eq!(cache.rebuild_count(), 1);
    }
}
