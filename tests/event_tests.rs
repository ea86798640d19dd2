//! Event adapter tests

#[cfg(test)]
mod tests {
    use creature_cache::{
        CacheConfig, Classification, Creature, CreatureCache, CreatureEvent, EntityHandle,
        EventAdapter, EventSource, ManualClock, Position, SharedCreature,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn make_cache(config: CacheConfig) -> CreatureCache {
        CreatureCache::with_clock(config, Arc::new(ManualClock::new(0)))
    }

    fn creature(id: u32) -> SharedCreature {
        Creature::new(id, "Troll", Classification::Hostile, Position::new(10, 10, 7)).shared()
    }

    /// Queue-backed event source.
    #[derive(Default)]
    struct QueueSource {
        queue: Mutex<Vec<CreatureEvent>>,
    }

    impl QueueSource {
        fn push(&self, event: CreatureEvent) {
            self.queue.lock().push(event);
        }
    }

    impl EventSource for QueueSource {
        fn drain_events(&self) -> Vec<CreatureEvent> {
            std::mem::take(&mut *self.queue.lock())
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    #[test]
    fn appear_then_disappear() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        let troll = creature(3);

        adapter.dispatch(&mut cache, &CreatureEvent::Appeared(EntityHandle::new(&troll)));
        assert!(cache.contains(3));

        adapter.dispatch(&mut cache, &CreatureEvent::Disappeared { id: 3 });
        assert!(!cache.contains(3));

        let stats = adapter.stats();
        assert_eq!(stats.appeared, 1);
        assert_eq!(stats.disappeared, 1);
        assert_eq!(stats.ignored, 0);
    }

    #[test]
    fn health_change_refreshes_entry() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        let troll = creature(3);
        let h = EntityHandle::new(&troll);

        adapter.dispatch(&mut cache, &CreatureEvent::Appeared(h.clone()));
        troll.write().health_percent = 12;
        adapter.dispatch(&mut cache, &CreatureEvent::HealthChanged(h));

        assert_eq!(cache.peek(3).unwrap().health_percent, 12);
    }

    #[test]
    fn health_change_for_unknown_creature_inserts_it() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        let troll = creature(8);

        adapter.dispatch(&mut cache, &CreatureEvent::HealthChanged(EntityHandle::new(&troll)));
        assert!(cache.contains(8));
    }

    #[test]
    fn vanished_creature_is_ignored() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        let troll = creature(3);
        let h = EntityHandle::new(&troll);
        drop(troll);

        adapter.dispatch(&mut cache, &CreatureEvent::Appeared(h));
        assert!(cache.is_empty());
        assert_eq!(adapter.stats().ignored, 1);
    }

    #[test]
    fn disappear_for_unknown_id_is_noop() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        adapter.dispatch(&mut cache, &CreatureEvent::Disappeared { id: 77 });
        assert!(cache.is_empty());
        assert_eq!(adapter.stats().disappeared, 1);
    }

    #[test]
    fn moves_follow_config() {
        let troll = creature(3);
        let h = EntityHandle::new(&troll);

        let mut tracking = make_cache(CacheConfig::default());
        let mut ignoring = make_cache(CacheConfig {
            track_moves: false,
            ..Default::default()
        });
        let mut adapter = EventAdapter::new();

        adapter.dispatch(&mut tracking, &CreatureEvent::Appeared(h.clone()));
        adapter.dispatch(&mut ignoring, &CreatureEvent::Appeared(h.clone()));

        if let Some(pos) = troll.write().position.as_mut() {
            pos.y += 1;
        }
        adapter.dispatch(&mut tracking, &CreatureEvent::Moved(h.clone()));
        adapter.dispatch(&mut ignoring, &CreatureEvent::Moved(h));

        assert_eq!(tracking.peek(3).unwrap().position, Some(Position::new(10, 11, 7)));
        assert_eq!(ignoring.peek(3).unwrap().position, Some(Position::new(10, 10, 7)));
        assert_eq!(adapter.stats().moved, 2);
        assert_eq!(adapter.stats().ignored, 1);
    }

    #[test]
    fn moves_do_not_dirty_the_index() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        let troll = creature(3);
        let h = EntityHandle::new(&troll);

        adapter.dispatch(&mut cache, &CreatureEvent::Appeared(h.clone()));
        cache.bucket(Classification::Hostile);

        for _ in 0..20 {
            adapter.dispatch(&mut cache, &CreatureEvent::Moved(h.clone()));
            adapter.dispatch(&mut cache, &CreatureEvent::HealthChanged(h.clone()));
        }
        assert!(!cache.is_index_dirty());
        assert_eq!(cache.rebuild_count(), 1);
    }

    // -----------------------------------------------------------------------
    // Pumping a source
    // -----------------------------------------------------------------------

    #[test]
    fn pump_applies_events_in_order() {
        let mut cache = make_cache(CacheConfig::default());
        let mut adapter = EventAdapter::new();
        let source = QueueSource::default();
        let a = creature(1);
        let b = creature(2);

        source.push(CreatureEvent::Appeared(EntityHandle::new(&a)));
        source.push(CreatureEvent::Appeared(EntityHandle::new(&b)));
        source.push(CreatureEvent::Disappeared { id: 1 });

        assert_eq!(adapter.pump(&mut cache, &source), 3);
        assert_eq!(cache.lru_order(), vec![2]);
        assert_eq!(adapter.pump(&mut cache, &source), 0);
    }

    #[test]
    fn burst_respects_capacity() {
        let mut cache = make_cache(CacheConfig {
            max_size: 10,
            ..Default::default()
        });
        let mut adapter = EventAdapter::new();
        let creatures: Vec<_> = (1..=100).map(creature).collect();
        let events: Vec<_> = creatures
            .iter()
            .map(|c| CreatureEvent::Appeared(EntityHandle::new(c)))
            .collect();

        assert_eq!(adapter.dispatch_all(&mut cache, &events), 100);
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.lru_order(), (91..=100).collect::<Vec<_>>());
    }
}
