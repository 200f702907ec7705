/// A TickSpot task, the leaf an entry is booked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub projects: Vec<Project>,
}

/// Client -> Project -> Task, in document order. Rebuilt from the remote on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    clients: Vec<Client>,
}

impl Taxonomy {
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    #[cfg(test)]
    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Attach `project` to the client with `client_id`, creating the client
    /// on first sight. Later sightings keep the first name.
    pub fn add_project(&mut self, client_id: &str, client_name: &str, project: Project) {
        match self.clients.iter_mut().find(|c| c.id == client_id) {
            Some(client) => client.projects.push(project),
            None => self.clients.push(Client {
                id: client_id.to_string(),
                name: client_name.to_string(),
                projects: vec![project],
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn project_count(&self) -> usize {
        self.clients.iter().map(|c| c.projects.len()).sum()
    }
}
