//! Component categories eligible for lifecycle logging
//!
//! The set is closed: a class qualifies only if it descends from one of the
//! eight framework base classes below.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{ClassModel, ResolutionError};

/// Framework component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Application,
    /// Activity-like screen
    Screen,
    Fragment,
    /// Support-library fragment
    CompatFragment,
    View,
    Service,
    BroadcastReceiver,
    ContentProvider,
}

impl Category {
    /// Every category, in resolution order
    pub const ALL: [Category; 8] = [
        Category::Screen,
        Category::Fragment,
        Category::CompatFragment,
        Category::View,
        Category::Service,
        Category::BroadcastReceiver,
        Category::ContentProvider,
        Category::Application,
    ];

    /// Framework base class a member of this category must descend from
    pub fn base_class(self) -> &'static str {
        match self {
            Category::Application => "android.app.Application",
            Category::Screen => "android.app.Activity",
            Category::Fragment => "android.app.Fragment",
            Category::CompatFragment => "android.support.v4.app.Fragment",
            Category::View => "android.view.View",
            Category::Service => "android.app.Service",
            Category::BroadcastReceiver => "android.content.BroadcastReceiver",
            Category::ContentProvider => "android.content.ContentProvider",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Application => "application",
            Category::Screen => "screen",
            Category::Fragment => "fragment",
            Category::CompatFragment => "compat-fragment",
            Category::View => "view",
            Category::Service => "service",
            Category::BroadcastReceiver => "broadcast-receiver",
            Category::ContentProvider => "content-provider",
        };
        f.write_str(s)
    }
}

/// All categories the class belongs to
///
/// Resolution errors propagate; they are never read as "not a member".
pub fn matching_categories(class: &dyn ClassModel) -> Result<Vec<Category>, ResolutionError> {
    let mut found = Vec::new();
    for category in Category::ALL {
        if class.resolve_category(category)? {
            found.push(category);
        }
    }
    Ok(found)
}

/// True if the class belongs to at least one category
pub fn is_any_category(class: &dyn ClassModel) -> Result<bool, ResolutionError> {
    for category in Category::ALL {
        if class.resolve_category(category)? {
            tracing::trace!("{} matches category {}", class.name(), category);
            return Ok(true);
        }
    }
    Ok(false)
}
