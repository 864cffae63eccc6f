// cm_area.rs -- area connectivity through area portals
//
// Areas are flooded into groups through every portal with a positive open
// count; two areas are connected when they share a flood number.

use log::warn;

use crate::cmodel::CollisionModel;
use crate::error::{CmResult, CollisionError};

impl CollisionModel {
    fn flood_area(&mut self, start: usize, flood_num: i32) -> CmResult<()> {
        let n = self.num_areas;
        let mut stack = vec![start];

        while let Some(area_num) = stack.pop() {
            let area = &mut self.areas[area_num];
            if area.flood_valid == self.flood_valid {
                if area.flood_num == flood_num {
                    continue;
                }
                return Err(CollisionError::format("FloodArea_r: reflooded"));
            }

            area.flood_num = flood_num;
            area.flood_valid = self.flood_valid;

            let con = &self.area_portals[area_num * n..][..n];
            stack.extend((0..n).rev().filter(|&i| con[i] > 0));
        }
        Ok(())
    }

    /// Recomputes which areas can see each other.
    pub fn flood_area_connections(&mut self) -> CmResult<()> {
        self.flood_valid += 1;
        let mut flood_num = 0;

        for i in 0..self.num_areas {
            if self.areas[i].flood_valid == self.flood_valid {
                continue; // already flooded into
            }
            flood_num += 1;
            self.flood_area(i, flood_num)?;
        }
        Ok(())
    }

    /// Opens or closes one reference on the portal between two areas.
    /// Negative areas (outside the level) are ignored.
    pub fn adjust_area_portal_state(&mut self, area1: i32, area2: i32, open: bool) -> CmResult<()> {
        let (Ok(a1), Ok(a2)) = (usize::try_from(area1), usize::try_from(area2)) else {
            return Ok(());
        };
        let n = self.num_areas;
        if a1 >= n || a2 >= n {
            return Err(CollisionError::invalid(format!(
                "AdjustAreaPortalState: bad area {} / {} ({} areas)",
                area1, area2, n
            )));
        }

        if open {
            self.area_portals[a1 * n + a2] += 1;
            self.area_portals[a2 * n + a1] += 1;
        } else {
            if self.area_portals[a1 * n + a2] <= 0 || self.area_portals[a2 * n + a1] <= 0 {
                return Err(CollisionError::invalid(format!(
                    "AdjustAreaPortalState: negative reference count between {} and {}",
                    area1, area2
                )));
            }
            self.area_portals[a1 * n + a2] -= 1;
            self.area_portals[a2 * n + a1] -= 1;
        }

        self.flood_area_connections()
    }

    pub fn areas_connected(&self, area1: i32, area2: i32) -> bool {
        if self.no_areas {
            return true;
        }

        let (Ok(a1), Ok(a2)) = (usize::try_from(area1), usize::try_from(area2)) else {
            return false;
        };
        if a1 >= self.num_areas || a2 >= self.num_areas {
            warn!("AreasConnected: area {} / {} out of range", area1, area2);
            return false;
        }

        self.areas[a1].flood_num == self.areas[a2].flood_num
    }

    /// One bit per area, set for every area connected to `area`.
    ///
    /// A negative area (a point outside the level) or the `no_areas` setting
    /// marks every area.
    pub fn write_area_bits(&self, area: i32) -> CmResult<Vec<u8>> {
        let bytes = (self.num_areas + 7) >> 3;

        let area = match usize::try_from(area) {
            Ok(a) if !self.no_areas => a,
            _ => return Ok(vec![0xff; bytes]),
        };
        if area >= self.num_areas {
            return Err(CollisionError::invalid(format!(
                "WriteAreaBits: bad area {} ({} areas)",
                area, self.num_areas
            )));
        }

        let mut buffer = vec![0u8; bytes];
        let flood_num = self.areas[area].flood_num;
        for (i, a) in self.areas.iter().enumerate() {
            if a.flood_num == flood_num {
                buffer[i >> 3] |= 1 << (i & 7);
            }
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmodel::CArea;
    use crate::testkit::sample_map;

    fn sample() -> CollisionModel {
        CollisionModel::decode_bytes("maps/sample.bsp", &sample_map()).unwrap()
    }

    /// A bare model with `n` areas and no level geometry.
    fn areas(n: usize) -> CollisionModel {
        let mut cm = CollisionModel {
            num_areas: n,
            areas: vec![CArea::default(); n],
            area_portals: vec![0; n * n],
            ..Default::default()
        };
        cm.flood_area_connections().unwrap();
        cm
    }

    #[test]
    fn areas_start_disconnected() {
        let cm = sample();
        assert!(cm.areas_connected(0, 0));
        assert!(!cm.areas_connected(0, 1));
        assert_ne!(cm.areas[0].flood_num, cm.areas[1].flood_num);
    }

    #[test]
    fn portals_connect_and_disconnect() {
        let mut cm = sample();
        cm.adjust_area_portal_state(0, 1, true).unwrap();
        assert!(cm.areas_connected(0, 1));
        assert!(cm.areas_connected(1, 0));

        // two references need two closes
        cm.adjust_area_portal_state(1, 0, true).unwrap();
        cm.adjust_area_portal_state(0, 1, false).unwrap();
        assert!(cm.areas_connected(0, 1));
        cm.adjust_area_portal_state(0, 1, false).unwrap();
        assert!(!cm.areas_connected(0, 1));
    }

    #[test]
    fn closing_a_closed_portal_fails() {
        let mut cm = sample();
        assert!(matches!(
            cm.adjust_area_portal_state(0, 1, false),
            Err(CollisionError::InvalidArgument(_))
        ));
        assert_eq!(cm.area_portals, vec![0; 4]);
    }

    #[test]
    fn out_of_range_areas() {
        let mut cm = sample();
        assert!(cm.adjust_area_portal_state(0, 2, true).is_err());
        assert!(cm.adjust_area_portal_state(-1, 1, true).is_ok());
        assert_eq!(cm.area_portals, vec![0; 4]);

        assert!(!cm.areas_connected(-1, 0));
        assert!(!cm.areas_connected(0, 5));
    }

    #[test]
    fn flooding_is_transitive() {
        let mut cm = areas(5);
        cm.adjust_area_portal_state(0, 1, true).unwrap();
        cm.adjust_area_portal_state(1, 2, true).unwrap();
        cm.adjust_area_portal_state(3, 4, true).unwrap();

        assert!(cm.areas_connected(0, 2));
        assert!(cm.areas_connected(4, 3));
        assert!(!cm.areas_connected(2, 3));

        cm.adjust_area_portal_state(1, 2, false).unwrap();
        assert!(cm.areas_connected(0, 1));
        assert!(!cm.areas_connected(0, 2));
    }

    #[test]
    fn no_areas_connects_everything() {
        let mut cm = sample();
        cm.no_areas = true;
        assert!(cm.areas_connected(0, 1));
        assert!(cm.areas_connected(-1, 7));
        assert_eq!(cm.write_area_bits(0).unwrap(), vec![0xff]);
    }

    #[test]
    fn area_bits() {
        let mut cm = areas(10);
        assert_eq!(cm.write_area_bits(-1).unwrap(), vec![0xff, 0xff]);
        assert_eq!(cm.write_area_bits(3).unwrap(), vec![0x08, 0x00]);

        cm.adjust_area_portal_state(3, 9, true).unwrap();
        assert_eq!(cm.write_area_bits(9).unwrap(), vec![0x08, 0x02]);
        assert!(cm.write_area_bits(10).is_err());
    }

    #[test]
    fn reflood_with_another_number_is_detected() {
        let mut cm = areas(2);
        // one-way portal: only possible from a corrupted table
        cm.area_portals[1] = 1;
        cm.flood_valid += 1;
        cm.areas[1].flood_valid = cm.flood_valid;
        cm.areas[1].flood_num = 7;
        assert!(cm.flood_area(0, 1).is_err());
    }
}
