//! Examples of using the set-trie
use set_trie::{FnComparer, HashComparer, SetTrie, SetTrieMap};

fn main() {
    // Recipes keyed by the ingredients they need
    let mut recipes = SetTrieMap::<&str, &str>::new();
    recipes.insert(vec!["egg", "flour", "milk"], "pancakes").unwrap();
    recipes.insert(vec!["egg"], "boiled egg").unwrap();
    recipes.insert(vec!["bread", "butter"], "toast").unwrap();
    recipes.insert(vec!["egg", "milk"], "omelette").unwrap();

    // What can be cooked from the pantry?
    let pantry = vec!["milk", "egg", "butter", "salt"];
    let mut cookable: Vec<_> = recipes.subsets(pantry).unwrap().copied().collect();
    cookable.sort_unstable();
    println!("cookable: {:?}", cookable);
    assert_eq!(cookable, vec!["boiled egg", "omelette"]);

    // Which recipes use milk?
    let mut with_milk: Vec<_> = recipes.supersets(vec!["milk"]).unwrap().copied().collect();
    with_milk.sort_unstable();
    println!("with milk: {:?}", with_milk);
    assert_eq!(with_milk, vec!["omelette", "pancakes"]);

    // Sets as their own values, ordered by length and then alphabetically
    let by_len = FnComparer::new(|a: &String, b: &String| a.len().cmp(&b.len()).then(a.cmp(b)));
    let mut tags = SetTrie::with_comparer(by_len);
    tags.insert(vec!["rust".to_string(), "io".to_string()]).unwrap();
    tags.insert(vec!["io".to_string()]).unwrap();
    for set in tags.supersets(vec!["io".to_string()]).unwrap() {
        println!("tagged io: {:?}", set);
    }

    // Elements with no natural order can still be stored through their hashes
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Color(u8, u8, u8);

    let mut palettes = SetTrieMap::with_comparer(HashComparer::new());
    palettes.insert(vec![Color(255, 0, 0), Color(0, 0, 255)], "primary-ish").unwrap();
    palettes.insert(vec![Color(0, 0, 0)], "mono").unwrap();
    assert_eq!(
        palettes.get(vec![Color(0, 0, 255), Color(255, 0, 0)]).unwrap(),
        Some(&"primary-ish")
    );
}

#[test]
fn test_removal_hides_recipe() {
    let mut recipes = SetTrieMap::<&str, &str>::new();
    recipes.insert(vec!["egg", "milk"], "omelette").unwrap();
    recipes.insert(vec!["egg"], "boiled egg").unwrap();

    assert!(recipes.remove(vec!["milk", "egg"]).unwrap());
    let found: Vec<_> = recipes.subsets(vec!["egg", "milk"]).unwrap().copied().collect();
    assert_eq!(found, vec!["boiled egg"]);
}
