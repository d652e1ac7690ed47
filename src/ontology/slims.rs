use std::sync::Arc;

use tracing::debug;

use crate::{
    errors::{Error, Result},
    ontology::entities::Slim,
    sparql::{
        fetch, queries,
        rows::{MemberRow, SlimRow, TitleRow},
        ClientHandle,
    },
};

/// Reads the ontology catalog and the slims declared in it.
#[derive(Clone)]
pub struct SlimLookup {
    client: Arc<ClientHandle>,
}

impl SlimLookup {
    pub fn new(client: Arc<ClientHandle>) -> Self {
        Self { client }
    }

    /// Titles of every ontology the service hosts.
    pub async fn ontology_titles(&self) -> Result<Vec<String>> {
        let rows: Vec<TitleRow> =
            fetch(self.client.as_ref(), &queries::ontology_titles_query()).await?;
        Ok(rows.into_iter().map(|row| row.title).collect())
    }

    /// Lists the slims of the ontology titled `ontology`.
    ///
    /// The title is checked against a freshly fetched catalog first. Slims are
    /// keyed by name: a name returned twice keeps its first position and its
    /// last description.
    pub async fn list_slims(&self, ontology: &str) -> Result<Vec<Slim>> {
        let available = self.ontology_titles().await?;
        if !available.iter().any(|title| title == ontology) {
            return Err(Error::InvalidOntology {
                ontology: ontology.to_string(),
                available,
            });
        }

        let rows: Vec<SlimRow> =
            fetch(self.client.as_ref(), &queries::slim_list_query(ontology)).await?;
        let mut slims: Vec<Slim> = Vec::new();
        for row in rows {
            match slims.iter_mut().find(|slim| slim.name() == row.label) {
                Some(existing) => *existing = Slim::new(row.label, row.comment),
                None => slims.push(Slim::new(row.label, row.comment)),
            }
        }
        debug!(ontology, slims = slims.len(), "slim_list_fetched");
        Ok(slims)
    }

    /// Members of the named slims, one query per slim, concatenated in order.
    ///
    /// Terms shared by several slims appear once per slim.
    pub async fn slim_members(&self, slims: &[String]) -> Result<Vec<String>> {
        let mut members = Vec::new();
        for slim in slims {
            let rows: Vec<MemberRow> =
                fetch(self.client.as_ref(), &queries::slim_members_query(slim)).await?;
            debug!(slim = %slim, members = rows.len(), "slim_members_fetched");
            members.extend(rows.into_iter().map(|row| row.term));
        }
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::SlimLookup;
    use crate::{errors::Error, sparql::QueryRow, testing::ScriptedClient};

    fn catalog() -> Vec<QueryRow> {
        vec![
            QueryRow::from_pairs([("title", "Cell Ontology")]),
            QueryRow::from_pairs([("title", "Uberon multi-species anatomy ontology")]),
        ]
    }

    #[tokio::test]
    async fn unknown_ontology_lists_catalog() {
        let lookup = SlimLookup::new(Arc::new(ScriptedClient::queued(vec![catalog()])));

        let err = lookup.list_slims("Cell Ontologyy").await.expect_err("invalid");
        match err {
            Error::InvalidOntology { ontology, available } => {
                assert_eq!(ontology, "Cell Ontologyy");
                assert_eq!(
                    available,
                    vec!["Cell Ontology", "Uberon multi-species anatomy ontology"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slims_are_deduplicated_by_name() {
        let client = Arc::new(ScriptedClient::queued(vec![
            catalog(),
            vec![
                QueryRow::from_pairs([("label", "blood_and_immune_upper_slim"), ("comment", "old")]),
                QueryRow::from_pairs([("label", "eye_upper_slim"), ("comment", "eye")]),
                QueryRow::from_pairs([("label", "blood_and_immune_upper_slim"), ("comment", "new")]),
            ],
        ]));
        let lookup = SlimLookup::new(client.clone());

        let slims = lookup.list_slims("Cell Ontology").await.expect("slims");

        let names: Vec<&str> = slims.iter().map(|slim| slim.name()).collect();
        assert_eq!(names, vec!["blood_and_immune_upper_slim", "eye_upper_slim"]);
        assert_eq!(slims[0].description(), "new");
        assert!(client.recorded()[1]
            .query
            .contains("FILTER(str(?title) = 'Cell Ontology')"));
    }

    #[tokio::test]
    async fn members_are_concatenated_per_slim() {
        let client = Arc::new(ScriptedClient::queued(vec![
            vec![
                QueryRow::from_pairs([("term", "CL:0000084")]),
                QueryRow::from_pairs([("term", "CL:0000236")]),
            ],
            vec![QueryRow::from_pairs([("term", "CL:0000084")])],
        ]));
        let lookup = SlimLookup::new(client.clone());

        let members = lookup
            .slim_members(&["blood_and_immune_upper_slim".to_string(), "eye_upper_slim".to_string()])
            .await
            .expect("members");

        assert_eq!(members, vec!["CL:0000084", "CL:0000236", "CL:0000084"]);
        assert_eq!(client.call_count(), 2);
    }
}
