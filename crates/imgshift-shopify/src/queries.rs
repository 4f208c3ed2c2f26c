//! GraphQL documents sent to the Admin API.

/// Images and variants are fetched in a single page of 250, the Admin API
/// maximum for both connections.
pub const PRODUCT: &str = r"
query product($id: ID!) {
  product(id: $id) {
    id
    handle
    title
    images(first: 250) {
      edges { node { id url altText } }
      pageInfo { hasNextPage endCursor }
    }
    variants(first: 250) {
      edges { node { id selectedOptions { name value } image { id } } }
      pageInfo { hasNextPage endCursor }
    }
  }
}";

pub const PRODUCT_SEARCH: &str = r"
query productSearch($query: String!, $after: String) {
  products(first: 250, query: $query, after: $after) {
    edges { node { id title handle vendor } }
    pageInfo { hasNextPage endCursor }
  }
}";

pub const STAGED_UPLOADS_CREATE: &str = r"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets { url resourceUrl parameters { name value } }
    userErrors { field message }
  }
}";

pub const FILE_CREATE: &str = r"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      id
      fileStatus
      ... on MediaImage { image { url } }
      ... on GenericFile { url }
    }
    userErrors { field message }
  }
}";

pub const FILE_NODE: &str = r"
query fileNode($id: ID!) {
  node(id: $id) {
    ... on MediaImage { id fileStatus image { url } }
    ... on GenericFile { id fileStatus url }
  }
}";
