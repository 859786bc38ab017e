//! GROQ queries sent to the content store

/// Every post's slug, for path enumeration
pub const POST_SLUGS: &str = r#"*[_type=="post" && defined(slug.current)]{
  _id,
  slug
}"#;

/// One post by `$slug`, with its author joined and only the approved
/// comments that reference it
pub const POST_BY_SLUG: &str = r#"*[_type=="post" && slug.current == $slug][0]{
  _id,
  _createdAt,
  title,
  author->{
    name,
    image
  },
  'comments': *[
    _type == "comment" &&
    post._ref == ^._id &&
    approved == true
  ],
  description,
  mainImage,
  slug,
  body
}"#;

/// Post cards for the home page
pub const POST_SUMMARIES: &str = r#"*[_type=="post" && defined(slug.current)]{
  _id,
  _createdAt,
  title,
  author->{
    name,
    image
  },
  description,
  mainImage,
  slug
}"#;
