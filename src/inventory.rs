//! Inventory index: per-zone FIFO pools of available desks.
//!
//! Built once per run. A desk that has been popped (or withdrawn) is gone for
//! the rest of the run, so the index can never hand out the same desk twice.

use std::collections::{HashMap, VecDeque};

use tracing::warn;

use crate::model::{Desk, DeskId, DeskType, Zone, ZoneId, ZoneType};

#[derive(Debug, Clone)]
struct ZonePool {
    zone: Zone,
    /// Desks that physically exist in this zone.
    capacity: usize,
    available: VecDeque<DeskId>,
}

#[derive(Debug, Clone)]
pub struct Inventory {
    /// Pools in ascending zone id order.
    pools: Vec<ZonePool>,
    by_id: HashMap<ZoneId, usize>,
    by_name: HashMap<String, usize>,
    desks: HashMap<DeskId, Desk>,
}

impl Inventory {
    pub fn new(zones: &[Zone], desks: &[Desk]) -> Self {
        let mut sorted_zones: Vec<&Zone> = zones.iter().collect();
        sorted_zones.sort_by_key(|zone| zone.id);

        let mut pools = Vec::with_capacity(sorted_zones.len());
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();

        for zone in sorted_zones {
            if by_id.contains_key(&zone.id) {
                warn!(zone_id = zone.id, "duplicate zone id, keeping the first");
                continue;
            }
            if !zone.counts_consistent() {
                warn!(
                    zone = %zone.name,
                    total = zone.total_desks,
                    typed = zone.typed_desks.values().sum::<u32>(),
                    "zone desk type counts do not add up to its total"
                );
            }
            by_id.insert(zone.id, pools.len());
            by_name.entry(zone.name.clone()).or_insert(pools.len());
            pools.push(ZonePool {
                zone: zone.clone(),
                capacity: 0,
                available: VecDeque::new(),
            });
        }

        let mut sorted_desks: Vec<&Desk> = desks.iter().collect();
        sorted_desks.sort_by_key(|desk| desk.id);

        let mut desk_map = HashMap::with_capacity(sorted_desks.len());
        for desk in sorted_desks {
            let Some(&pool_index) = by_id.get(&desk.zone_id) else {
                warn!(desk_id = desk.id, zone_id = desk.zone_id, "desk references unknown zone, skipping");
                continue;
            };
            if desk_map.contains_key(&desk.id) {
                warn!(desk_id = desk.id, "duplicate desk id, skipping");
                continue;
            }
            let pool = &mut pools[pool_index];
            pool.capacity += 1;
            pool.available.push_back(desk.id);
            desk_map.insert(desk.id, desk.clone());
        }

        for pool in &pools {
            if pool.capacity != pool.zone.total_desks as usize {
                warn!(
                    zone = %pool.zone.name,
                    declared = pool.zone.total_desks,
                    actual = pool.capacity,
                    "zone total differs from its desk records, using the records"
                );
            }
        }

        Self {
            pools,
            by_id,
            by_name,
            desks: desk_map,
        }
    }

    pub fn zone(&self, zone_id: ZoneId) -> Option<&Zone> {
        self.pool(zone_id).map(|pool| &pool.zone)
    }

    pub fn zone_by_name(&self, name: &str) -> Option<&Zone> {
        self.by_name.get(name).map(|&index| &self.pools[index].zone)
    }

    /// All zones in ascending id order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.pools.iter().map(|pool| &pool.zone)
    }

    pub fn zones_of_type(&self, zone_type: ZoneType) -> impl Iterator<Item = &Zone> + '_ {
        self.zones().filter(move |zone| zone.zone_type == zone_type)
    }

    pub fn desk(&self, desk_id: DeskId) -> Option<&Desk> {
        self.desks.get(&desk_id)
    }

    pub fn desk_type(&self, desk_id: DeskId) -> Option<DeskType> {
        self.desk(desk_id).map(|desk| desk.desk_type)
    }

    /// Zone a desk belongs to.
    pub fn zone_of(&self, desk_id: DeskId) -> Option<&Zone> {
        self.desk(desk_id).and_then(|desk| self.zone(desk.zone_id))
    }

    /// Remaining desks of a zone, front to back.
    pub fn available_desks(&self, zone_id: ZoneId) -> impl Iterator<Item = DeskId> + '_ {
        self.pool(zone_id)
            .into_iter()
            .flat_map(|pool| pool.available.iter().copied())
    }

    pub fn available(&self, zone_id: ZoneId) -> usize {
        self.pool(zone_id).map_or(0, |pool| pool.available.len())
    }

    /// Number of desk records in the zone.
    pub fn capacity(&self, zone_id: ZoneId) -> usize {
        self.pool(zone_id).map_or(0, |pool| pool.capacity)
    }

    pub fn total_available(&self) -> usize {
        self.pools.iter().map(|pool| pool.available.len()).sum()
    }

    /// Take the next desk of a zone.
    pub fn pop_desk(&mut self, zone_id: ZoneId) -> Option<DeskId> {
        let index = *self.by_id.get(&zone_id)?;
        self.pools[index].available.pop_front()
    }

    /// True while nobody has been seated in the zone.
    pub fn is_zone_empty(&self, zone_id: ZoneId) -> bool {
        self.pool(zone_id)
            .is_some_and(|pool| pool.capacity > 0 && pool.available.len() == pool.capacity)
    }

    /// True once every desk of the zone has been handed out or withdrawn.
    pub fn is_exhausted(&self, zone_id: ZoneId) -> bool {
        self.pool(zone_id).is_none_or(|pool| pool.available.is_empty())
    }

    /// Remove every remaining desk of a zone from circulation.
    pub fn withdraw(&mut self, zone_id: ZoneId) -> Vec<DeskId> {
        match self.by_id.get(&zone_id) {
            Some(&index) => self.pools[index].available.drain(..).collect(),
            None => Vec::new(),
        }
    }

    /// Hand every remaining desk over, grouped by zone, leaving the index empty.
    pub fn drain_remaining(&mut self) -> Vec<(ZoneId, Vec<DeskId>)> {
        self.pools
            .iter_mut()
            .filter(|pool| !pool.available.is_empty())
            .map(|pool| (pool.zone.id, pool.available.drain(..).collect()))
            .collect()
    }

    fn pool(&self, zone_id: ZoneId) -> Option<&ZonePool> {
        self.by_id.get(&zone_id).map(|&index| &self.pools[index])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn zone(id: ZoneId, name: &str, total: u32) -> Zone {
        Zone {
            id,
            name: name.to_string(),
            zone_type: ZoneType::Open,
            floor: 0,
            typed_desks: BTreeMap::from([(DeskType::Standard, total)]),
            total_desks: total,
        }
    }

    fn desk(id: DeskId, zone_id: ZoneId) -> Desk {
        Desk {
            id,
            zone_id,
            desk_type: DeskType::Standard,
            name: format!("D{id}"),
        }
    }

    #[test]
    fn test_pools_are_fifo_by_desk_id() {
        let zones = vec![zone(1, "A", 3)];
        let desks = vec![desk(3, 1), desk(1, 1), desk(2, 1)];
        let mut inventory = Inventory::new(&zones, &desks);

        assert_eq!(inventory.available_desks(1).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(inventory.pop_desk(1), Some(1));
        assert_eq!(inventory.pop_desk(1), Some(2));
        assert_eq!(inventory.pop_desk(1), Some(3));
        assert_eq!(inventory.pop_desk(1), None);
        assert!(inventory.is_exhausted(1));
    }

    #[test]
    fn test_zone_empty_means_untouched() {
        let zones = vec![zone(1, "A", 2)];
        let desks = vec![desk(1, 1), desk(2, 1)];
        let mut inventory = Inventory::new(&zones, &desks);

        assert!(inventory.is_zone_empty(1));
        inventory.pop_desk(1);
        assert!(!inventory.is_zone_empty(1));
        assert!(!inventory.is_exhausted(1));
    }

    #[test]
    fn test_desk_records_win_over_declared_total() {
        let zones = vec![zone(1, "A", 5)];
        let desks = vec![desk(1, 1), desk(2, 1)];
        let inventory = Inventory::new(&zones, &desks);

        assert_eq!(inventory.capacity(1), 2);
        assert!(inventory.is_zone_empty(1));
    }

    #[test]
    fn test_orphan_and_duplicate_desks_are_skipped() {
        let zones = vec![zone(1, "A", 1)];
        let desks = vec![desk(1, 1), desk(1, 1), desk(2, 99)];
        let inventory = Inventory::new(&zones, &desks);

        assert_eq!(inventory.total_available(), 1);
        assert!(inventory.desk(2).is_none());
    }

    #[test]
    fn test_withdraw_and_drain() {
        let zones = vec![zone(1, "A", 2), zone(2, "B", 1)];
        let desks = vec![desk(1, 1), desk(2, 1), desk(3, 2)];
        let mut inventory = Inventory::new(&zones, &desks);

        assert_eq!(inventory.withdraw(1), vec![1, 2]);
        assert_eq!(inventory.drain_remaining(), vec![(2, vec![3])]);
        assert_eq!(inventory.total_available(), 0);
        assert_eq!(inventory.zone_by_name("B").map(|z| z.id), Some(2));
        assert_eq!(inventory.zone_of(3).map(|z| z.name.as_str()), Some("B"));
    }
}
