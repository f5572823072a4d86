//! Creator-facing service submission and package edits.

use crate::domain::model::{
    validate_packages, Category, Creator, Money, Service, ServicePackage, ServiceRecord,
    MAX_PACKAGES_PER_SERVICE,
};
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{require_text, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub delivery_days: u32,
    #[serde(default)]
    pub revisions: u32,
    pub features: Vec<String>,
}

impl PackageDraft {
    /// Features left blank in the form are dropped.
    fn filled_features(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn into_package(self, id: String) -> ServicePackage {
        let features = self.filled_features();
        ServicePackage {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            delivery_days: self.delivery_days,
            revisions: self.revisions,
            features,
        }
    }
}

impl Validate for PackageDraft {
    fn validate(&self) -> Result<()> {
        require_text("package name", &self.name)?;
        if self.delivery_days == 0 {
            return Err(MarketError::validation(format!(
                "Package '{}' needs a delivery time",
                self.name
            )));
        }
        if self.filled_features().is_empty() {
            return Err(MarketError::validation(format!(
                "Package '{}' needs at least one feature",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub portfolio: Vec<String>,
    pub packages: Vec<PackageDraft>,
}

fn validate_drafts(drafts: &[PackageDraft]) -> Result<()> {
    if drafts.is_empty() || drafts.len() > MAX_PACKAGES_PER_SERVICE {
        return Err(MarketError::validation(format!(
            "A service needs between 1 and {} packages",
            MAX_PACKAGES_PER_SERVICE
        )));
    }
    drafts.iter().try_for_each(|d| d.validate())
}

impl Validate for ServiceDraft {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        validate_drafts(&self.packages)
    }
}

fn number_packages(service_id: &str, drafts: Vec<PackageDraft>) -> Vec<ServicePackage> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| draft.into_package(format!("{}-p{}", service_id, i + 1)))
        .collect()
}

/// Turns a validated draft into a fresh listing with no sales or interest yet.
pub fn build_service(
    service_id: String,
    creator: Creator,
    draft: ServiceDraft,
    now: DateTime<Utc>,
) -> Result<Service> {
    draft.validate()?;

    let packages = number_packages(&service_id, draft.packages);
    validate_packages(&packages)?;

    Service::try_from(ServiceRecord {
        id: service_id,
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        category: draft.category,
        creator,
        packages,
        portfolio: draft.portfolio,
        sales_count: 0,
        interested_count: 0,
        tags: draft.tags,
        created_at: now,
    })
}

/// Replaces the package list on behalf of `creator_id`, who must own the
/// service. Returns the updated copy; `service` itself is left alone.
pub fn revise_packages(
    service: &Service,
    creator_id: &str,
    drafts: Vec<PackageDraft>,
) -> Result<Service> {
    if !service.owned_by(creator_id) {
        return Err(MarketError::validation(format!(
            "Service '{}' can only be edited by its creator",
            service.id
        )));
    }
    validate_drafts(&drafts)?;

    let mut updated = service.clone();
    updated.replace_packages(number_packages(&service.id, drafts))?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CreatorLevel;

    fn creator() -> Creator {
        Creator {
            id: "c1".to_string(),
            name: "Lia".to_string(),
            avatar: None,
            rating: 0.0,
            review_count: 0,
            level: CreatorLevel::Tier1,
            verified: false,
            completed_projects: 0,
            response_time: "1d".to_string(),
        }
    }

    fn package(name: &str, price: u64, days: u32) -> PackageDraft {
        PackageDraft {
            name: name.to_string(),
            description: String::new(),
            price: Money::from_minor(price),
            delivery_days: days,
            revisions: 1,
            features: vec!["Color grading".to_string(), "  ".to_string()],
        }
    }

    fn draft(packages: Vec<PackageDraft>) -> ServiceDraft {
        ServiceDraft {
            title: "  Reels for brands ".to_string(),
            description: "Cuts, captions and music".to_string(),
            category: Category::ReelsEditing,
            tags: vec!["reels".to_string()],
            portfolio: vec![],
            packages,
        }
    }

    #[test]
    fn test_build_service_numbers_packages_and_drops_blank_features() {
        let service = build_service(
            "s9".to_string(),
            creator(),
            draft(vec![package("Basic", 9_990, 3), package("Standard", 19_990, 2)]),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(service.title, "Reels for brands");
        assert_eq!(service.packages()[0].id, "s9-p1");
        assert_eq!(service.packages()[1].id, "s9-p2");
        assert_eq!(service.packages()[0].features, vec!["Color grading"]);
        assert_eq!(service.min_price(), Money::from_minor(9_990));
        assert_eq!(service.min_delivery_days(), 2);
        assert_eq!(service.sales_count, 0);
    }

    #[test]
    fn test_draft_rules() {
        let no_title = ServiceDraft {
            title: " ".to_string(),
            ..draft(vec![package("Basic", 100, 1)])
        };
        assert!(no_title.validate().is_err());
        assert!(draft(vec![]).validate().is_err());
        assert!(draft(vec![package("a", 1, 1); 4]).validate().is_err());
        assert!(draft(vec![package("Basic", 100, 0)]).validate().is_err());

        let mut blank = package("Basic", 100, 1);
        blank.features = vec!["".to_string()];
        assert!(draft(vec![blank]).validate().is_err());
    }

    #[test]
    fn test_revise_packages_requires_owner() {
        let service = build_service(
            "s1".to_string(),
            creator(),
            draft(vec![package("Basic", 100, 5)]),
            Utc::now(),
        )
        .unwrap();

        let err = revise_packages(&service, "intruder", vec![package("Cheap", 1, 1)]).unwrap_err();
        assert!(matches!(err, MarketError::Validation { .. }));

        let updated =
            revise_packages(&service, "c1", vec![package("Fast", 300, 1), package("Slow", 50, 9)])
                .unwrap();
        assert_eq!(updated.min_price(), Money::from_minor(50));
        assert_eq!(updated.max_price(), Money::from_minor(300));
        assert_eq!(updated.min_delivery_days(), 1);
        assert_eq!(service.min_price(), Money::from_minor(100));
    }
}
