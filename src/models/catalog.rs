use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub active: bool,
}

/// Services grouped under their category for the admin listing.
/// Uncategorized services are collected under `category: None`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: Option<ServiceCategory>,
    pub services: Vec<Service>,
}

pub fn group_by_category(categories: &[ServiceCategory], services: Vec<Service>) -> Vec<CategoryGroup> {
    let mut sorted = categories.to_vec();
    sorted.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

    let mut groups: Vec<CategoryGroup> = sorted
        .into_iter()
        .map(|c| CategoryGroup {
            category: Some(c),
            services: vec![],
        })
        .collect();
    let mut uncategorized = vec![];

    for service in services {
        let slot = service.category_id.as_deref().and_then(|cid| {
            groups
                .iter_mut()
                .find(|g| g.category.as_ref().map(|c| c.id.as_str()) == Some(cid))
        });
        match slot {
            Some(group) => group.services.push(service),
            None => uncategorized.push(service),
        }
    }

    if !uncategorized.is_empty() {
        groups.push(CategoryGroup {
            category: None,
            services: uncategorized,
        });
    }
    groups
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
}
