use super::error::FilterError;
use super::types::{LabelFilter, LabelListQuery, RecipeFilter, RecipeListQuery};

impl RecipeFilter {
    pub fn from_query(query: &RecipeListQuery) -> Result<Self, FilterError> {
        Ok(Self {
            tags: parse_id_list("tags", query.tags.as_deref())?,
            ingredients: parse_id_list("ingredients", query.ingredients.as_deref())?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.ingredients.is_none()
    }

    /// AND across the two parameters, "any match" within each id list.
    pub fn matches(&self, tag_ids: &[i64], ingredient_ids: &[i64]) -> bool {
        intersects(self.tags.as_deref(), tag_ids) && intersects(self.ingredients.as_deref(), ingredient_ids)
    }
}

impl LabelFilter {
    pub fn from_query(query: &LabelListQuery) -> Result<Self, FilterError> {
        let assigned_only = match query.assigned_only.as_deref().map(str::trim) {
            None | Some("") => false,
            Some("true") | Some("True") => true,
            Some("false") | Some("False") => false,
            Some(raw) => raw.parse::<i64>().map(|n| n != 0).map_err(|_| FilterError::InvalidFlag {
                param: "assigned_only".to_string(),
                value: raw.to_string(),
            })?,
        };
        Ok(Self { assigned_only })
    }
}

fn intersects(wanted: Option<&[i64]>, actual: &[i64]) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.iter().any(|id| wanted.contains(id)),
    }
}

/// Parse `"1, 2,,3"` into a sorted, deduplicated id list.
///
/// Blank segments are skipped; a parameter with no ids at all is treated as
/// absent. Anything that is not an integer rejects the whole request.
pub fn parse_id_list(param: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, FilterError> {
    let Some(raw) = raw else { return Ok(None) };

    let mut ids = Vec::new();
    for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id = segment.parse::<i64>().map_err(|_| FilterError::InvalidId {
            param: param.to_string(),
            value: segment.to_string(),
        })?;
        ids.push(id);
    }

    if ids.is_empty() {
        return Ok(None);
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(tags: Option<&str>, ingredients: Option<&str>) -> RecipeListQuery {
        RecipeListQuery {
            tags: tags.map(String::from),
            ingredients: ingredients.map(String::from),
        }
    }

    #[test]
    fn parses_comma_separated_ids() {
        let filter = RecipeFilter::from_query(&query(Some("3,1, 2,3"), None)).unwrap();
        assert_eq!(filter.tags, Some(vec![1, 2, 3]));
        assert_eq!(filter.ingredients, None);
    }

    #[test]
    fn empty_parameter_means_no_restriction() {
        let filter = RecipeFilter::from_query(&query(Some(""), Some(" , "))).unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches(&[], &[]));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = RecipeFilter::from_query(&query(None, Some("4,feta"))).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidId { param: "ingredients".to_string(), value: "feta".to_string() }
        );
    }

    #[test]
    fn any_match_within_a_list() {
        let filter = RecipeFilter::from_query(&query(Some("1,2"), None)).unwrap();
        assert!(filter.matches(&[2, 7], &[]));
        assert!(!filter.matches(&[7], &[1]));
        assert!(!filter.matches(&[], &[]));
    }

    #[test]
    fn both_lists_must_match() {
        let filter = RecipeFilter::from_query(&query(Some("1"), Some("10"))).unwrap();
        assert!(filter.matches(&[1], &[10, 11]));
        assert!(!filter.matches(&[1], &[11]));
        assert!(!filter.matches(&[2], &[10]));
    }

    #[test]
    fn assigned_only_flag() {
        let parse = |v: Option<&str>| LabelFilter::from_query(&LabelListQuery { assigned_only: v.map(String::from) });
        assert!(!parse(None).unwrap().assigned_only);
        assert!(!parse(Some("0")).unwrap().assigned_only);
        assert!(parse(Some("1")).unwrap().assigned_only);
        assert!(parse(Some("true")).unwrap().assigned_only);
        assert!(parse(Some("yes")).is_err());
    }
}
