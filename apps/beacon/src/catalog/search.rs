use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::Catalog;
use crate::domain::Legend;

impl Catalog {
    /// Legends matching `query` on name, alias or genre, best match first.
    ///
    /// Ties keep catalog order; an empty query returns the whole roster.
    pub fn search_legends(&self, query: &str) -> Vec<&Legend> {
        let query = query.trim();
        if query.is_empty() {
            return self.legends.iter().collect();
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored: Vec<(i64, &Legend)> = self
            .legends
            .iter()
            .filter_map(|legend| {
                [&legend.name, &legend.alias, &legend.genre]
                    .into_iter()
                    .filter_map(|field| matcher.fuzzy_match(field, query))
                    .max()
                    .map(|score| (score, legend))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, legend)| legend).collect()
    }
}
