use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// Basic type aliases for clarity
pub type EntityId = String;

/// Read an explicit `null` the same way as a missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(|v| v.unwrap_or(true))
}

/// Node category used by the visibility switches. Synthetic nodes inherit the
/// category of the entity that produced them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Companies,
    Persons,
    Shareholders,
    Addresses,
    Bankruptcies,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Companies,
        Category::Persons,
        Category::Shareholders,
        Category::Addresses,
        Category::Bankruptcies,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Companies => "Companies",
            Category::Persons => "Persons",
            Category::Shareholders => "Shareholders",
            Category::Addresses => "Addresses",
            Category::Bankruptcies => "Bankruptcies",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtoData {
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourtCase {
    pub uuid: Option<String>,
    pub case_number: Option<String>,
    pub case_type: Option<String>,
    pub court_name: Option<String>,
    pub state: Option<String>,
    pub party_role: Option<String>,
    pub notification_time: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub acn: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub ato_data: Option<AtoData>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub court_cases: Vec<CourtCase>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Director,
    #[serde(alias = "office_holder", alias = "officeHolder")]
    Officeholder,
    Secretary,
    // any role type this client does not know yet
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRole {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: RoleKind,
    #[serde(default)]
    pub original_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl PersonRole {
    /// A role is former when upstream tagged it former/ceased in either field.
    pub fn is_former(&self) -> bool {
        [self.original_type.as_deref(), self.role.as_deref()]
            .into_iter()
            .flatten()
            .any(|s| {
                let s = s.to_lowercase();
                s.contains("former") || s.contains("ceased")
            })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<PersonRole>,
    #[serde(default)]
    pub dob: Option<String>,
}

/// Upstream sends share counts either as numbers or as preformatted strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shares {
    Count(f64),
    Text(String),
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shares::Count(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Shares::Count(n) => write!(f, "{}", n),
            Shares::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderRecord {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub shares: Option<Shares>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    // legacy single link, folded into linked_entity_ids by the catalog
    #[serde(default)]
    pub linked_entity_id: Option<EntityId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub linked_entity_ids: Vec<EntityId>,
}

impl AddressRecord {
    pub fn is_ceased(&self) -> bool {
        self.end_date.is_some()
            || self
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("ceased"))
    }
}

fn default_true() -> bool { true }

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankruptcyRecord {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub has_bankruptcy: bool,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub extract_id: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

/// Raw entity lists as delivered by the data endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySet {
    #[serde(deserialize_with = "null_as_default")]
    pub companies: Vec<CompanyRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub persons: Vec<PersonRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub shareholders: Vec<ShareholderRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: Vec<AddressRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub bankruptcies: Vec<BankruptcyRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from: EntityId,
    pub to: EntityId,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uncertain: bool,
    #[serde(default)]
    pub similarity_percentage: Option<f64>,
    #[serde(default)]
    pub extract_id: Option<String>,
}

#[derive(Clone, Debug)]
pub enum Entity {
    Company(CompanyRecord),
    Person(PersonRecord),
    Shareholder(ShareholderRecord),
    Address(AddressRecord),
    Bankruptcy(BankruptcyRecord),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Company(e) => &e.id,
            Entity::Person(e) => &e.id,
            Entity::Shareholder(e) => &e.id,
            Entity::Address(e) => &e.id,
            Entity::Bankruptcy(e) => &e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Company(e) => &e.name,
            Entity::Person(e) => &e.name,
            Entity::Shareholder(e) => &e.name,
            Entity::Address(e) => &e.name,
            Entity::Bankruptcy(e) => &e.name,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Entity::Company(_) => Category::Companies,
            Entity::Person(_) => Category::Persons,
            Entity::Shareholder(_) => Category::Shareholders,
            Entity::Address(_) => Category::Addresses,
            Entity::Bankruptcy(_) => Category::Bankruptcies,
        }
    }
}

/// Category-tagged entities addressable by id, in a stable order.
#[derive(Clone, Debug, Default)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
}

impl EntityCatalog {
    pub fn new() -> Self { Self::default() }

    pub fn from_entity_set(set: EntitySet) -> Self {
        let mut catalog = Self::new();
        let EntitySet { companies, persons, shareholders, addresses, bankruptcies } = set;
        for c in companies { catalog.insert(Entity::Company(c)); }
        for p in persons { catalog.insert(Entity::Person(p)); }
        for s in shareholders { catalog.insert(Entity::Shareholder(s)); }
        for a in addresses { catalog.insert(Entity::Address(normalize_address(a))); }
        for b in bankruptcies { catalog.insert(Entity::Bankruptcy(b)); }
        log::debug!("entity catalog normalized: {} entities", catalog.len());
        catalog
    }

    // First occurrence wins so node ids stay unique across variants
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.index.contains_key(entity.id()) {
            log::warn!(
                "dropping duplicate entity id '{}' ({})",
                entity.id(),
                entity.category().title()
            );
            return false;
        }
        self.index.insert(entity.id().to_string(), self.entities.len());
        self.entities.push(entity);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    pub fn contains(&self, id: &str) -> bool { self.index.contains_key(id) }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> { self.entities.iter() }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.category() == category)
    }

    pub fn category_of(&self, id: &str) -> Option<Category> {
        self.get(id).map(Entity::category)
    }

    pub fn len(&self) -> usize { self.entities.len() }

    pub fn is_empty(&self) -> bool { self.entities.is_empty() }
}

fn normalize_address(mut address: AddressRecord) -> AddressRecord {
    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut ids: Vec<EntityId> = Vec::with_capacity(address.linked_entity_ids.len() + 1);
    if let Some(legacy) = address.linked_entity_id.take() {
        log::debug!("address '{}': merged legacy linkedEntityId", address.id);
        address.linked_entity_ids.insert(0, legacy);
    }
    for id in address.linked_entity_ids.drain(..) {
        if !id.is_empty() && seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    address.linked_entity_ids = ids;
    address
}
