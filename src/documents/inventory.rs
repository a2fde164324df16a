// src/documents/inventory.rs
use crate::documents::models::{DocumentInventory, DuplicateName, RegionInventory, GROUP_UNDEFINED};
use crate::extractors::{
    entries_in, extract_named_entries, find_duplicates, strip_comments, Anchor, Delimiters, Entry, KeyPattern,
    SectionExtractor,
};
use crate::utils::error::ExtractError;
use std::borrow::Cow;
use std::collections::BTreeMap;

const LABEL_MAX_CHARS: usize = 80;

/// How to carve a document into regions and name their entries.
#[derive(Debug, Clone)]
pub struct InventoryOptions {
    pub anchor: Anchor,
    pub delimiters: Delimiters,
    pub key: KeyPattern,
    /// Secondary key to tally named entries by, e.g. `serviceType`.
    pub group_by: Option<KeyPattern>,
    pub strip_comments: bool,
}

/// Lists every anchored region in `text` with the names of its top-level entries.
///
/// A document with no matching region is an empty inventory, not an error.
/// An unbalanced region aborts the whole document.
pub fn inventory(
    extractor: &SectionExtractor,
    path: &str,
    text: &str,
    options: &InventoryOptions,
) -> Result<DocumentInventory, ExtractError> {
    let cleaned = if options.strip_comments {
        strip_comments(text)
    } else {
        Cow::Borrowed(text)
    };

    let spans = extractor.find_all_regions(&cleaned, &options.anchor, options.delimiters, Some(';'))?;
    if spans.is_empty() {
        tracing::warn!("No region matching {} in {}", options.anchor, path);
    }

    let regions: Vec<RegionInventory> = spans
        .into_iter()
        .map(|span| {
            let region_text = span.slice(&cleaned);
            let entries = entries_in(region_text, &options.key);
            let unnamed = entries.iter().filter(|e| e.name.is_none()).count();
            let groups = match &options.group_by {
                Some(group_key) => group_counts(region_text, &entries, group_key),
                None => BTreeMap::new(),
            };
            RegionInventory {
                label: label_for(region_text),
                span,
                names: entries.into_iter().filter_map(|e| e.name).collect(),
                unnamed,
                groups,
            }
        })
        .collect();

    let all_names: Vec<&str> = regions
        .iter()
        .flat_map(|r| r.names.iter().map(String::as_str))
        .collect();
    let duplicates = find_duplicates(&all_names)
        .into_iter()
        .map(|(name, count)| DuplicateName { name, count })
        .collect();

    Ok(DocumentInventory {
        path: path.to_string(),
        comments_stripped: options.strip_comments,
        regions,
        duplicates,
    })
}

/// Named entries per first `group_key` match inside each entry.
fn group_counts(region_text: &str, entries: &[Entry], group_key: &KeyPattern) -> BTreeMap<String, usize> {
    let mut groups = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.name.is_some()) {
        let value = extract_named_entries(entry.text(region_text), group_key)
            .next()
            .unwrap_or(GROUP_UNDEFINED);
        *groups.entry(value.to_string()).or_insert(0) += 1;
    }
    groups
}

fn label_for(region_text: &str) -> String {
    let first_line = region_text.lines().next().unwrap_or_default().trim();
    first_line.chars().take(LABEL_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEED: &str = r#"
/* legacy:
const OLD_SERVICES: ServiceDefinition[] = [ { name: 'Antigo' } ];
*/
const HEALTH_SERVICES: ServiceDefinition[] = [
  {
    name: 'Consulta',
    formSchema: { fields: [ { name: 'cpf' } ] },
  },
  { name: 'Exame' }, // { name: 'Comentado' }
];

const SPORTS_SERVICES: ServiceDefinition[] = [
  { name: 'Quadra' },
  { name: 'Consulta' },
];
"#;

    fn options(strip: bool) -> InventoryOptions {
        InventoryOptions {
            anchor: Anchor::wildcard("const *_SERVICES: ServiceDefinition[] = [").unwrap(),
            delimiters: Delimiters::SQUARE,
            key: KeyPattern::default(),
            group_by: None,
            strip_comments: strip,
        }
    }

    #[test]
    fn test_inventory_counts_top_level_entries_per_region() {
        let inv = inventory(&SectionExtractor::new(), "seed.ts", SEED, &options(true)).unwrap();

        let labels: Vec<&str> = inv.regions.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "const HEALTH_SERVICES: ServiceDefinition[] = [",
                "const SPORTS_SERVICES: ServiceDefinition[] = [",
            ]
        );
        assert_eq!(inv.names(), vec!["Consulta", "Exame", "Quadra", "Consulta"]);
        assert_eq!(inv.entry_count(), 4);
        assert_eq!(inv.duplicates, vec![DuplicateName { name: "Consulta".to_string(), count: 2 }]);
    }

    #[test]
    fn test_comments_are_counted_without_stripping() {
        let inv = inventory(&SectionExtractor::new(), "seed.ts", SEED, &options(false)).unwrap();
        assert_eq!(inv.regions.len(), 3);
        assert_eq!(inv.regions[0].names, vec!["Antigo".to_string()]);
        assert_eq!(inv.regions[1].names, vec!["Consulta".to_string(), "Exame".to_string(), "Comentado".to_string()]);
    }

    #[test]
    fn test_document_without_regions_is_empty() {
        let inv = inventory(&SectionExtractor::new(), "x.ts", "export {}", &options(true)).unwrap();
        assert!(inv.regions.is_empty());
        assert_eq!(inv.entry_count(), 0);
    }

    #[test]
    fn test_unbalanced_document_is_an_error() {
        let text = "const A_SERVICES: ServiceDefinition[] = [ { name: 'x' }";
        let result = inventory(&SectionExtractor::new(), "x.ts", text, &options(true));
        assert!(matches!(result, Err(ExtractError::UnbalancedRegion { .. })));
    }

    #[test]
    fn test_group_by_tallies_values_with_undefined_bucket() {
        let text = r#"const A_SERVICES: ServiceDefinition[] = [
  { name: 'Consulta', serviceType: 'COM_DADOS' },
  { name: 'Aviso', serviceType: 'INFORMATIVO' },
  { name: 'Exame', serviceType: 'COM_DADOS', formSchema: { serviceType: 'INFORMATIVO' } },
  { name: 'Solto' },
  { serviceType: 'ANONIMO' },
];"#;
        let mut opts = options(true);
        opts.group_by = Some("serviceType".parse().unwrap());

        let inv = inventory(&SectionExtractor::new(), "a.ts", text, &opts).unwrap();
        let groups: Vec<(&str, usize)> = inv.regions[0].groups.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(groups, vec![("COM_DADOS", 2), ("INFORMATIVO", 1), ("undefined", 1)]);
        assert_eq!(inv.regions[0].unnamed, 1);

        let plain = inventory(&SectionExtractor::new(), "a.ts", text, &options(true)).unwrap();
        assert!(plain.regions[0].groups.is_empty());
    }
}
