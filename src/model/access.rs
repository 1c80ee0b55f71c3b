/// Entity-level access rules: the roles allowed to perform each CRUD
/// operation against the entity as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityAccess {
    pub find: Vec<String>,
    pub insert: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
}

impl EntityAccess {
    pub fn new() -> Self {
        EntityAccess::default()
    }

    pub fn is_empty(&self) -> bool {
        self.find.is_empty()
            && self.insert.is_empty()
            && self.update.is_empty()
            && self.delete.is_empty()
    }
}

/// Field-level access rules. Fields have no delete rule; removing data is an
/// entity-level operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldAccess {
    pub find: Vec<String>,
    pub insert: Vec<String>,
    pub update: Vec<String>,
}

impl FieldAccess {
    pub fn new() -> Self {
        FieldAccess::default()
    }

    pub fn is_empty(&self) -> bool {
        self.find.is_empty() && self.insert.is_empty() && self.update.is_empty()
    }
}
