//! Department → gender breakdown.

use serde::Serialize;

use super::{group_in_order, rows};
use crate::models::HospitalTable;

/// Gender ring entry under a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunburstLeaf {
    /// Gender label
    pub gender: String,
    /// Summed age of the department/gender rows
    pub value: i64,
}

/// Department ring entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunburstBranch {
    /// Department label
    pub department: String,
    /// Sum of the leaf values
    pub value: i64,
    /// Genders in order of first appearance within the department
    pub children: Vec<SunburstLeaf>,
}

/// Two-level hierarchy of summed age
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sunburst {
    /// Departments in order of first appearance
    pub branches: Vec<SunburstBranch>,
}

/// Flattened sunburst node in id/parent form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunburstNode {
    /// Unique path id, e.g. `Cardiology/Male`
    pub id: String,
    /// Display label
    pub label: String,
    /// Id of the parent node; empty for departments
    pub parent: String,
    /// Node value
    pub value: i64,
}

impl Sunburst {
    /// Sum of all department values
    #[must_use]
    pub fn total(&self) -> i64 {
        self.branches.iter().map(|branch| branch.value).sum()
    }

    /// Flatten into id/label/parent/value nodes, departments first
    #[must_use]
    pub fn nodes(&self) -> Vec<SunburstNode> {
        let departments = self.branches.iter().map(|branch| SunburstNode {
            id: branch.department.clone(),
            label: branch.department.clone(),
            parent: String::new(),
            value: branch.value,
        });
        let genders = self.branches.iter().flat_map(|branch| {
            branch.children.iter().map(|leaf| SunburstNode {
                id: format!("{}/{}", branch.department, leaf.gender),
                label: leaf.gender.clone(),
                parent: branch.department.clone(),
                value: leaf.value,
            })
        });
        departments.chain(genders).collect()
    }
}

/// Build the department → gender hierarchy
///
/// Rows missing a department or gender have no place in the hierarchy and
/// are left out; missing ages count as zero.
#[must_use]
pub fn sunburst(view: &HospitalTable) -> Sunburst {
    let by_department = group_in_order(rows(view).filter_map(|row| {
        Some((row.department?, (row.gender?, row.age.unwrap_or_default())))
    }));

    let branches = by_department
        .into_iter()
        .map(|(department, entries)| {
            let children: Vec<SunburstLeaf> = group_in_order(entries)
                .into_iter()
                .map(|(gender, ages)| SunburstLeaf {
                    gender: gender.to_string(),
                    value: ages.into_iter().sum(),
                })
                .collect();
            SunburstBranch {
                department: department.to_string(),
                value: children.iter().map(|leaf| leaf.value).sum(),
                children,
            }
        })
        .collect();

    Sunburst { branches }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdmissionRecord;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn table() -> HospitalTable {
        HospitalTable::from_records(&[
            AdmissionRecord::new("1", 30, "Male", "Cardiology", date(1)),
            AdmissionRecord::new("2", 40, "Female", "Cardiology", date(2)),
            AdmissionRecord::new("3", 35, "Male", "Cardiology", date(3)),
            AdmissionRecord::new("4", 20, "Female", "Neurology", date(4)),
        ])
        .unwrap()
    }

    #[test]
    fn test_leaves_sum_age_per_gender() {
        let chart = sunburst(&table());
        assert_eq!(chart.branches.len(), 2);

        let cardiology = &chart.branches[0];
        assert_eq!(cardiology.department, "Cardiology");
        assert_eq!(cardiology.value, 105);
        assert_eq!(
            cardiology.children,
            vec![
                SunburstLeaf { gender: "Male".to_string(), value: 65 },
                SunburstLeaf { gender: "Female".to_string(), value: 40 },
            ]
        );
        assert_eq!(chart.total(), 125);
    }

    #[test]
    fn test_nodes_use_path_ids() {
        let nodes = sunburst(&table()).nodes();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0].id, "Cardiology");
        assert_eq!(nodes[0].parent, "");
        let leaf = nodes.iter().find(|n| n.id == "Neurology/Female").unwrap();
        assert_eq!(leaf.parent, "Neurology");
        assert_eq!(leaf.value, 20);
    }

    #[test]
    fn test_empty_view_has_no_branches() {
        let chart = sunburst(&HospitalTable::empty());
        assert!(chart.branches.is_empty());
        assert!(chart.nodes().is_empty());
    }
}
