use serde::Deserialize;

/// A post of the subreddit listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub title: String,
    pub url: String,
}

/// The JSON document returned by the listing endpoint
#[derive(Debug, Deserialize)]
pub struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

impl Listing {
    pub fn into_posts(self) -> Vec<Post> {
        self.data.children.into_iter().map(|child| child.data).collect()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn parse_listing() {
        let json = indoc! {r#"
            {
                "kind": "Listing",
                "data": {
                    "after": "t3_xyz",
                    "children": [
                        { "kind": "t3", "data": { "title": "First", "url": "https://clips.twitch.tv/A", "score": 12 } },
                        { "kind": "t3", "data": { "title": "Second", "url": "https://v.redd.it/b" } }
                    ]
                }
            }
        "#};

        let posts = serde_json::from_str::<Listing>(json).unwrap().into_posts();
        assert_eq!(
            posts,
            vec![
                Post {
                    title: "First".to_owned(),
                    url: "https://clips.twitch.tv/A".to_owned(),
                },
                Post {
                    title: "Second".to_owned(),
                    url: "https://v.redd.it/b".to_owned(),
                },
            ]
        );
    }
}
